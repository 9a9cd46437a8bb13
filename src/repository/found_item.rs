use std::path::Path;

use bytemuck::cast_slice;
use diesel::prelude::*;

use crate::domain::found_item::{FoundItem, NewFoundItem};
use crate::domain::types::FoundItemId;
use crate::models::found_item::{FoundItem as DbFoundItem, NewFoundItem as DbNewFoundItem};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, FoundItemReader, FoundItemWriter};

pub(crate) fn into_domain(rows: Vec<DbFoundItem>) -> RepositoryResult<Vec<FoundItem>> {
    rows.into_iter()
        .map(FoundItem::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| RepositoryError::ValidationError(err.to_string()))
}

impl FoundItemReader for DieselRepository {
    fn get_found_item(&self, id: FoundItemId) -> RepositoryResult<FoundItem> {
        use crate::schema::found_items;

        let mut conn = self.conn()?;

        let row = found_items::table
            .find(id.get())
            .select(DbFoundItem::as_select())
            .first(&mut conn)?;

        FoundItem::try_from(row).map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }

    fn list_found_items(&self) -> RepositoryResult<Vec<FoundItem>> {
        use crate::schema::found_items;

        let mut conn = self.conn()?;

        let rows = found_items::table
            .order(found_items::id.asc())
            .select(DbFoundItem::as_select())
            .load(&mut conn)?;

        into_domain(rows)
    }

    fn list_unmatched_found_items(&self) -> RepositoryResult<Vec<FoundItem>> {
        use crate::schema::found_items;

        let mut conn = self.conn()?;

        let rows = found_items::table
            .filter(found_items::matched.eq(false))
            .order(found_items::id.asc())
            .select(DbFoundItem::as_select())
            .load(&mut conn)?;

        into_domain(rows)
    }
}

impl FoundItemWriter for DieselRepository {
    fn create_found_item(&self, item: &NewFoundItem) -> RepositoryResult<FoundItem> {
        use crate::schema::found_items;

        let mut conn = self.conn()?;

        let row = diesel::insert_into(found_items::table)
            .values(DbNewFoundItem::from(item))
            .returning(DbFoundItem::as_returning())
            .get_result(&mut conn)?;

        FoundItem::try_from(row).map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }

    fn set_found_item_image_path(&self, id: FoundItemId, path: &Path) -> RepositoryResult<usize> {
        use crate::schema::found_items;

        let mut conn = self.conn()?;

        let affected = diesel::update(found_items::table.find(id.get()))
            .set(found_items::image_path.eq(path.to_string_lossy().into_owned()))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_found_item_embedding(
        &self,
        id: FoundItemId,
        embedding: &[f32],
    ) -> RepositoryResult<usize> {
        use crate::schema::found_items;

        let mut conn = self.conn()?;

        // Convert &[f32] to &[u8]
        let blob: Vec<u8> = cast_slice(embedding).to_vec();

        let affected = diesel::update(found_items::table.find(id.get()))
            .set(found_items::embedding.eq(blob))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
