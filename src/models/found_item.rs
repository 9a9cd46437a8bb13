//! Diesel row types for the `found_items` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::found_item::{FoundItem as DomainFoundItem, NewFoundItem as DomainNewFoundItem};
use crate::domain::types::{ContactNumber, FoundItemId, ValidationError, decode_embedding};
use crate::schema::found_items;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = found_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FoundItem {
    pub id: i32,
    pub caption: String,
    pub location: String,
    pub contact: String,
    pub image_path: String,
    pub matched: bool,
    pub embedding: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = found_items)]
pub struct NewFoundItem {
    pub caption: String,
    pub location: String,
    pub contact: String,
    pub image_path: String,
}

impl From<&DomainNewFoundItem> for NewFoundItem {
    fn from(item: &DomainNewFoundItem) -> Self {
        Self {
            caption: item.caption.clone(),
            location: item.location.clone(),
            contact: item.contact.as_str().to_string(),
            image_path: item.image_path.to_string_lossy().into_owned(),
        }
    }
}

impl TryFrom<FoundItem> for DomainFoundItem {
    type Error = ValidationError;

    fn try_from(row: FoundItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FoundItemId::new(row.id)?,
            caption: row.caption,
            location: row.location,
            contact: ContactNumber::parse(&row.contact)?,
            image_path: row.image_path.into(),
            matched: row.matched,
            embedding: row.embedding.as_deref().map(decode_embedding).transpose()?,
            created_at: row.created_at,
        })
    }
}
