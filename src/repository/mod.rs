use std::path::{Path, PathBuf};

use crate::db::{DbConnection, DbPool};
use crate::domain::found_item::{FoundItem, NewFoundItem};
use crate::domain::lost_item::{LostItem, NewLostItem};
use crate::domain::types::{FoundItemId, LostItemId, LostStatus};
use crate::processing::archive::ArchiveError;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod found_item;
pub mod lost_item;
pub mod matching;

/// Repository backed by a diesel SQLite pool. Every call checks out its own
/// connection.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

pub trait FoundItemReader {
    fn get_found_item(&self, id: FoundItemId) -> RepositoryResult<FoundItem>;
    /// All found items in insertion order, matched or not.
    fn list_found_items(&self) -> RepositoryResult<Vec<FoundItem>>;
    /// Found items still waiting for their owner, in insertion order.
    fn list_unmatched_found_items(&self) -> RepositoryResult<Vec<FoundItem>>;
}

pub trait FoundItemWriter {
    fn create_found_item(&self, item: &NewFoundItem) -> RepositoryResult<FoundItem>;
    fn set_found_item_image_path(&self, id: FoundItemId, path: &Path) -> RepositoryResult<usize>;
    fn set_found_item_embedding(&self, id: FoundItemId, embedding: &[f32])
    -> RepositoryResult<usize>;
}

pub trait LostItemReader {
    fn get_lost_item(&self, id: LostItemId) -> RepositoryResult<LostItem>;
    fn list_lost_items(&self, status: LostStatus) -> RepositoryResult<Vec<LostItem>>;
}

pub trait LostItemWriter {
    fn create_lost_item(&self, item: &NewLostItem) -> RepositoryResult<LostItem>;
    fn set_lost_item_status(&self, id: LostItemId, status: LostStatus) -> RepositoryResult<usize>;
    fn set_lost_item_embedding(&self, id: LostItemId, embedding: &[f32])
    -> RepositoryResult<usize>;
}

/// Outcome of a committed match.
#[derive(Debug, Clone)]
pub struct ConfirmedMatch {
    /// The found item after archival, with its new image path.
    pub found_item: FoundItem,
    /// Lost items that moved from `lost` to `matched` in this transaction.
    pub lost_ids: Vec<LostItemId>,
}

pub trait MatchWriter {
    /// Atomically pairs a found item with lost items.
    ///
    /// Lost items no longer in `lost` status are skipped. Returns `None`
    /// without touching anything when the found item is already matched or
    /// none of the lost items could be claimed. `archive` moves the image and
    /// returns its new path; its failure rolls the whole match back.
    fn confirm_match<F>(
        &self,
        found_id: FoundItemId,
        lost_ids: &[LostItemId],
        archive: F,
    ) -> RepositoryResult<Option<ConfirmedMatch>>
    where
        F: FnOnce(&Path) -> Result<PathBuf, ArchiveError>;
}
