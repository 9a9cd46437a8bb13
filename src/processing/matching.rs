//! Pairs lost item reports with found items.
//!
//! Two entry points share the same confirmation step:
//!
//! * [`MatchingEngine::find_best_match`] runs when someone reports a lost
//!   item and picks the single most similar unmatched found item.
//! * [`MatchingEngine::notify_matching_lost_owners`] runs when a found item
//!   is uploaded and confirms every open lost report above the threshold.
//!
//! Confirming a match flips the lost reports to `matched`, marks the found
//! item, archives its image in one transaction and then emails the owners.

use thiserror::Error;

use crate::SIMILARITY_THRESHOLD;
use crate::domain::found_item::FoundItem;
use crate::domain::lost_item::LostItem;
use crate::domain::types::{LostItemId, LostStatus};
use crate::processing::archive::{ArchiveError, Archiver};
use crate::processing::embedding::{
    EmbeddingError, EmbeddingResult, TextEmbedder, load_or_generate_embedding,
};
use crate::processing::notifier::Notifier;
use crate::processing::similarity::{self, cosine_similarity};
use crate::repository::errors::RepositoryError;
use crate::repository::{
    FoundItemReader, FoundItemWriter, LostItemReader, LostItemWriter, MatchWriter,
};

pub const MATCH_SUBJECT: &str = "Match Found for Your Lost Item!";

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("archive failed: {0}")]
    Archive(ArchiveError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for MatchError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Archive(error) => MatchError::Archive(error),
            other => MatchError::Repository(other),
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

/// Matching service with its collaborators injected at construction.
pub struct MatchingEngine<R, E, N> {
    repo: R,
    embedder: E,
    notifier: N,
    archiver: Archiver,
}

impl<R, E, N> MatchingEngine<R, E, N>
where
    R: FoundItemReader + FoundItemWriter + LostItemReader + LostItemWriter + MatchWriter,
    E: TextEmbedder,
    N: Notifier,
{
    pub fn new(repo: R, embedder: E, notifier: N, archiver: Archiver) -> Self {
        Self {
            repo,
            embedder,
            notifier,
            archiver,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Similarity of two free-form texts.
    pub fn score(&self, text_a: &str, text_b: &str) -> MatchResult<f32> {
        Ok(similarity::score(&self.embedder, text_a, text_b)?)
    }

    /// Pull-match for a freshly reported lost item.
    ///
    /// Scores every unmatched found item against the description and tries
    /// the candidates above [`SIMILARITY_THRESHOLD`] from the highest score
    /// down; the earliest stored item wins a tie. A candidate claimed by a
    /// concurrent match is skipped in favour of the next one. The first
    /// confirmed match is archived and the owner notified. Returns the found
    /// item with its archived image path.
    pub fn find_best_match(&self, lost_item: &LostItem) -> MatchResult<Option<FoundItem>> {
        let query = self.lost_embedding(lost_item, None)?;
        let candidates = self.repo.list_unmatched_found_items()?;

        let mut scored = Vec::with_capacity(candidates.len());
        for found_item in candidates {
            let embedding = self.found_embedding(&found_item, Some(query.len()))?;
            let score = cosine_similarity(&query, &embedding);
            log::debug!(
                "Lost item {} vs found item {}: {score:.4}",
                lost_item.id,
                found_item.id
            );
            scored.push((found_item, score));
        }

        let ranked = ranked_above_threshold(scored);
        if ranked.is_empty() {
            log::info!("No found item matches lost item {}", lost_item.id);
            return Ok(None);
        }

        for (candidate, score) in ranked {
            log::info!(
                "Lost item {} matches found item {} with score {score:.4}",
                lost_item.id,
                candidate.id
            );

            let confirmed = self
                .repo
                .confirm_match(candidate.id, &[lost_item.id], |path| {
                    self.archiver.archive(path)
                })?;

            if let Some(confirmed) = confirmed {
                self.notify_owner(lost_item, &confirmed.found_item);
                return Ok(Some(confirmed.found_item));
            }

            if self.repo.get_lost_item(lost_item.id)?.status != LostStatus::Lost {
                log::warn!("Lost item {} was matched concurrently", lost_item.id);
                return Ok(None);
            }
            log::warn!(
                "Found item {} was matched concurrently; trying next candidate",
                candidate.id
            );
        }

        Ok(None)
    }

    /// Push-match for a freshly uploaded found item.
    ///
    /// Every lost report still in `lost` status that scores above the
    /// threshold is confirmed and its owner emailed. Returns the ids of the
    /// reports that were matched.
    pub fn notify_matching_lost_owners(
        &self,
        found_item: &FoundItem,
    ) -> MatchResult<Vec<LostItemId>> {
        if found_item.matched {
            log::warn!("Found item {} is already matched", found_item.id);
            return Ok(Vec::new());
        }

        let query = self.found_embedding(found_item, None)?;
        let open_reports = self.repo.list_lost_items(LostStatus::Lost)?;

        let mut matches = Vec::new();
        for lost_item in open_reports {
            let embedding = self.lost_embedding(&lost_item, Some(query.len()))?;
            let score = cosine_similarity(&embedding, &query);
            log::debug!(
                "Found item {} vs lost item {}: {score:.4}",
                found_item.id,
                lost_item.id
            );
            if score > SIMILARITY_THRESHOLD {
                matches.push(lost_item);
            }
        }

        if matches.is_empty() {
            log::info!("No lost item matches found item {}", found_item.id);
            return Ok(Vec::new());
        }

        let lost_ids = matches.iter().map(|item| item.id).collect::<Vec<_>>();
        let confirmed = self
            .repo
            .confirm_match(found_item.id, &lost_ids, |path| self.archiver.archive(path))?;

        let Some(confirmed) = confirmed else {
            log::warn!(
                "Found item {} or its candidate reports were matched concurrently; skipping",
                found_item.id
            );
            return Ok(Vec::new());
        };

        for lost_item in matches
            .iter()
            .filter(|item| confirmed.lost_ids.contains(&item.id))
        {
            self.notify_owner(lost_item, &confirmed.found_item);
        }

        log::info!(
            "Found item {} matched {} lost report(s)",
            found_item.id,
            confirmed.lost_ids.len()
        );

        Ok(confirmed.lost_ids)
    }

    fn notify_owner(&self, lost_item: &LostItem, found_item: &FoundItem) -> bool {
        let sent = self.notifier.notify(
            &lost_item.email,
            MATCH_SUBJECT,
            &match_notification_body(found_item),
        );
        if !sent {
            log::warn!(
                "Owner of lost item {} was not notified about found item {}",
                lost_item.id,
                found_item.id
            );
        }
        sent
    }

    /// Stored embeddings of another dimension come from a previous model and
    /// are regenerated.
    fn found_embedding(&self, item: &FoundItem, dim: Option<usize>) -> EmbeddingResult<Vec<f32>> {
        let existing = usable(item.embedding.as_deref(), dim);
        load_or_generate_embedding(existing, &item.caption, &self.embedder, |value| {
            if let Err(error) = self.repo.set_found_item_embedding(item.id, value) {
                log::warn!("Failed to store embedding for found item {}: {error}", item.id);
            }
        })
        .map(|(embedding, _)| embedding)
    }

    fn lost_embedding(&self, item: &LostItem, dim: Option<usize>) -> EmbeddingResult<Vec<f32>> {
        let existing = usable(item.embedding.as_deref(), dim);
        load_or_generate_embedding(existing, &item.description, &self.embedder, |value| {
            if let Err(error) = self.repo.set_lost_item_embedding(item.id, value) {
                log::warn!("Failed to store embedding for lost item {}: {error}", item.id);
            }
        })
        .map(|(embedding, _)| embedding)
    }
}

fn usable(embedding: Option<&[f32]>, dim: Option<usize>) -> Option<&[f32]> {
    embedding.filter(|value| dim.is_none_or(|dim| value.len() == dim))
}

/// Candidates scoring above the threshold, highest first. Equal scores keep
/// their input order.
fn ranked_above_threshold<T>(scored: impl IntoIterator<Item = (T, f32)>) -> Vec<(T, f32)> {
    let mut ranked = scored
        .into_iter()
        .filter(|(_, score)| *score > SIMILARITY_THRESHOLD)
        .collect::<Vec<_>>();
    ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    ranked
}

pub fn match_notification_body(found_item: &FoundItem) -> String {
    format!(
        "We found an item matching your description: {}. It was found at {}. Contact {} for more details.",
        found_item.caption, found_item.location, found_item.contact
    )
}
