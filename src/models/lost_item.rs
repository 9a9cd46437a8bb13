//! Diesel row types for the `lost_items` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lost_item::{LostItem as DomainLostItem, NewLostItem as DomainNewLostItem};
use crate::domain::types::{
    ContactNumber, LostItemId, LostStatus, ValidationError, decode_embedding,
};
use crate::schema::lost_items;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = lost_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LostItem {
    pub id: i32,
    pub description: String,
    pub contact: String,
    pub email: String,
    pub status: String,
    pub embedding: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lost_items)]
pub struct NewLostItem {
    pub description: String,
    pub contact: String,
    pub email: String,
    pub status: String,
}

impl From<&DomainNewLostItem> for NewLostItem {
    fn from(item: &DomainNewLostItem) -> Self {
        Self {
            description: item.description.clone(),
            contact: item.contact.as_str().to_string(),
            email: item.email.clone(),
            status: LostStatus::Lost.as_str().to_string(),
        }
    }
}

impl TryFrom<LostItem> for DomainLostItem {
    type Error = ValidationError;

    fn try_from(row: LostItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LostItemId::new(row.id)?,
            description: row.description,
            contact: ContactNumber::parse(&row.contact)?,
            email: row.email,
            status: row.status.parse()?,
            embedding: row.embedding.as_deref().map(decode_embedding).transpose()?,
            created_at: row.created_at,
        })
    }
}
