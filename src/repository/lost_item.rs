use bytemuck::cast_slice;
use diesel::prelude::*;

use crate::domain::lost_item::{LostItem, NewLostItem};
use crate::domain::types::{LostItemId, LostStatus};
use crate::models::lost_item::{LostItem as DbLostItem, NewLostItem as DbNewLostItem};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, LostItemReader, LostItemWriter};

impl LostItemReader for DieselRepository {
    fn get_lost_item(&self, id: LostItemId) -> RepositoryResult<LostItem> {
        use crate::schema::lost_items;

        let mut conn = self.conn()?;

        let row = lost_items::table
            .find(id.get())
            .select(DbLostItem::as_select())
            .first(&mut conn)?;

        LostItem::try_from(row).map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }

    fn list_lost_items(&self, status: LostStatus) -> RepositoryResult<Vec<LostItem>> {
        use crate::schema::lost_items;

        let mut conn = self.conn()?;

        let rows = lost_items::table
            .filter(lost_items::status.eq(status.as_str()))
            .order(lost_items::id.asc())
            .select(DbLostItem::as_select())
            .load(&mut conn)?;

        rows.into_iter()
            .map(LostItem::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }
}

impl LostItemWriter for DieselRepository {
    fn create_lost_item(&self, item: &NewLostItem) -> RepositoryResult<LostItem> {
        use crate::schema::lost_items;

        let mut conn = self.conn()?;

        let row = diesel::insert_into(lost_items::table)
            .values(DbNewLostItem::from(item))
            .returning(DbLostItem::as_returning())
            .get_result(&mut conn)?;

        LostItem::try_from(row).map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }

    fn set_lost_item_status(&self, id: LostItemId, status: LostStatus) -> RepositoryResult<usize> {
        use crate::schema::lost_items;

        let mut conn = self.conn()?;

        let affected = diesel::update(lost_items::table.find(id.get()))
            .set(lost_items::status.eq(status.as_str()))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_lost_item_embedding(
        &self,
        id: LostItemId,
        embedding: &[f32],
    ) -> RepositoryResult<usize> {
        use crate::schema::lost_items;

        let mut conn = self.conn()?;

        let blob: Vec<u8> = cast_slice(embedding).to_vec();

        let affected = diesel::update(lost_items::table.find(id.get()))
            .set(lost_items::embedding.eq(blob))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
