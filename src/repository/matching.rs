use std::path::{Path, PathBuf};

use diesel::prelude::*;

use crate::domain::found_item::FoundItem;
use crate::domain::types::{FoundItemId, LostItemId, LostStatus};
use crate::models::found_item::FoundItem as DbFoundItem;
use crate::processing::archive::ArchiveError;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ConfirmedMatch, DieselRepository, MatchWriter};

impl MatchWriter for DieselRepository {
    fn confirm_match<F>(
        &self,
        found_id: FoundItemId,
        lost_ids: &[LostItemId],
        archive: F,
    ) -> RepositoryResult<Option<ConfirmedMatch>>
    where
        F: FnOnce(&Path) -> Result<PathBuf, ArchiveError>,
    {
        use crate::schema::{found_items, lost_items};

        let mut conn = self.conn()?;
        let mut archived_to: Option<PathBuf> = None;

        // BEGIN IMMEDIATE takes the write lock up front, so the matched flags
        // read below cannot change before this transaction commits.
        let outcome = conn.immediate_transaction(|conn| {
            let found = found_items::table
                .find(found_id.get())
                .select(DbFoundItem::as_select())
                .first(conn)?;

            if found.matched {
                return Ok::<_, RepositoryError>(None);
            }

            let mut claimed = Vec::with_capacity(lost_ids.len());
            for lost_id in lost_ids {
                let affected = diesel::update(
                    lost_items::table
                        .find(lost_id.get())
                        .filter(lost_items::status.eq(LostStatus::Lost.as_str())),
                )
                .set(lost_items::status.eq(LostStatus::Matched.as_str()))
                .execute(conn)?;

                if affected == 1 {
                    claimed.push(*lost_id);
                }
            }

            if claimed.is_empty() {
                return Ok(None);
            }

            let new_path = archive(Path::new(&found.image_path))?;
            archived_to = Some(new_path.clone());

            let row = diesel::update(found_items::table.find(found_id.get()))
                .set((
                    found_items::matched.eq(true),
                    found_items::image_path.eq(new_path.to_string_lossy().into_owned()),
                ))
                .returning(DbFoundItem::as_returning())
                .get_result(conn)?;

            let found_item = FoundItem::try_from(row)
                .map_err(|err| RepositoryError::ValidationError(err.to_string()))?;

            Ok(Some(ConfirmedMatch {
                found_item,
                lost_ids: claimed,
            }))
        });

        if let (Err(error), Some(path)) = (&outcome, &archived_to) {
            log::error!(
                "Match for found item {found_id} rolled back after its image was moved to {}: {error}",
                path.display()
            );
        }

        outcome
    }
}
