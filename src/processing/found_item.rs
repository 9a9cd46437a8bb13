use crate::domain::found_item::{FoundItem, NewFoundItem};
use crate::domain::types::{ContactNumber, LostItemId, non_empty};
use crate::processing::caption::ImageCaptioner;
use crate::processing::embedding::TextEmbedder;
use crate::processing::intake::ImageStore;
use crate::processing::matching::MatchingEngine;
use crate::processing::notifier::Notifier;
use crate::processing::{CaptionSource, FoundItemSubmission, SubmissionError, SubmissionResult};
use crate::repository::{
    FoundItemReader, FoundItemWriter, LostItemReader, LostItemWriter, MatchWriter,
};

/// Stores a found item and notifies every owner whose report matches it.
///
/// The contact and location are validated before the upload is touched. The
/// image is saved in the unmatched area, captioned unless the finder
/// supplied a caption, and the new item is matched against open lost reports.
/// The saved image is removed again when captioning or storing the record
/// fails, so the same upload can be resubmitted.
pub async fn submit_found_item<R, E, N, C>(
    msg: FoundItemSubmission,
    engine: &MatchingEngine<R, E, N>,
    captioner: &C,
    images: &ImageStore,
) -> SubmissionResult<(FoundItem, Vec<LostItemId>)>
where
    R: FoundItemReader + FoundItemWriter + LostItemReader + LostItemWriter + MatchWriter,
    E: TextEmbedder,
    N: Notifier,
    C: ImageCaptioner + ?Sized,
{
    ContactNumber::parse(&msg.contact)?;
    non_empty(&msg.location, "location")?;
    if let CaptionSource::Manual(text) = &msg.caption {
        non_empty(text, "caption")?;
    }

    let (image_path, image) = images.store_upload(&msg.upload_path)?;

    let created = async {
        let caption = match &msg.caption {
            CaptionSource::Manual(text) => text.clone(),
            CaptionSource::Generated => {
                let caption = captioner.caption(&image).await?;
                log::info!("Generated caption for {}: {caption}", image_path.display());
                caption
            }
        };

        let new_item =
            NewFoundItem::new(&caption, &msg.location, &msg.contact, image_path.clone())?;
        Ok::<_, SubmissionError>(engine.repository().create_found_item(&new_item)?)
    }
    .await;

    let found_item = match created {
        Ok(found_item) => found_item,
        Err(error) => {
            images.discard(&msg.upload_path, &image_path);
            return Err(error);
        }
    };
    log::info!("Stored found item {}", found_item.id);

    let matched = engine.notify_matching_lost_owners(&found_item)?;

    Ok((found_item, matched))
}

/// Handles a found item submission from the queue and logs the outcome.
pub async fn process_found_item_message<R, E, N, C>(
    msg: FoundItemSubmission,
    engine: &MatchingEngine<R, E, N>,
    captioner: &C,
    images: &ImageStore,
) where
    R: FoundItemReader + FoundItemWriter + LostItemReader + LostItemWriter + MatchWriter,
    E: TextEmbedder,
    N: Notifier,
    C: ImageCaptioner + ?Sized,
{
    log::info!("Received found item: {}", msg.upload_path.display());

    match submit_found_item(msg, engine, captioner, images).await {
        Ok((found_item, matched)) => log::info!(
            "Finished processing found item {}: matched_reports={}",
            found_item.id,
            matched.len()
        ),
        Err(e) => log::error!("Error processing found item: {e}"),
    }
}
