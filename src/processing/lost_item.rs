use crate::domain::found_item::FoundItem;
use crate::domain::lost_item::{LostItem, NewLostItem};
use crate::processing::embedding::TextEmbedder;
use crate::processing::matching::MatchingEngine;
use crate::processing::notifier::Notifier;
use crate::processing::{LostItemSubmission, SubmissionResult};
use crate::repository::{
    FoundItemReader, FoundItemWriter, LostItemReader, LostItemWriter, MatchWriter,
};

/// Stores a lost item report and looks for the best matching found item.
pub fn submit_lost_item<R, E, N>(
    msg: LostItemSubmission,
    engine: &MatchingEngine<R, E, N>,
) -> SubmissionResult<(LostItem, Option<FoundItem>)>
where
    R: FoundItemReader + FoundItemWriter + LostItemReader + LostItemWriter + MatchWriter,
    E: TextEmbedder,
    N: Notifier,
{
    let new_item = NewLostItem::new(&msg.description, &msg.contact, &msg.email)?;
    let lost_item = engine.repository().create_lost_item(&new_item)?;
    log::info!("Stored lost item {}", lost_item.id);

    let found = engine.find_best_match(&lost_item)?;

    Ok((lost_item, found))
}

/// Handles a lost item report from the queue and logs the outcome.
pub async fn process_lost_item_message<R, E, N>(
    msg: LostItemSubmission,
    engine: &MatchingEngine<R, E, N>,
) where
    R: FoundItemReader + FoundItemWriter + LostItemReader + LostItemWriter + MatchWriter,
    E: TextEmbedder,
    N: Notifier,
{
    log::info!("Received lost item report");

    match submit_lost_item(msg, engine) {
        Ok((lost_item, Some(found_item))) => log::info!(
            "Lost item {} matched found item {} at {}",
            lost_item.id,
            found_item.id,
            found_item.location
        ),
        Ok((lost_item, None)) => {
            log::info!("No match yet for lost item {}", lost_item.id)
        }
        Err(e) => log::error!("Error processing lost item: {e}"),
    }
}
