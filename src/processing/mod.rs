use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::types::ValidationError;
use crate::processing::caption::CaptionError;
use crate::processing::intake::IntakeError;
use crate::processing::matching::MatchError;
use crate::repository::errors::RepositoryError;

pub mod archive;
pub mod caption;
pub mod embedding;
pub mod found_item;
pub mod intake;
pub mod lost_item;
pub mod matching;
pub mod notifier;
pub mod similarity;

/// Submissions pushed by the web front end.
#[derive(Deserialize, Debug)]
pub enum ZMQMessage {
    FoundItem(FoundItemSubmission),
    LostItem(LostItemSubmission),
}

#[derive(Deserialize, Debug, Clone)]
pub struct FoundItemSubmission {
    /// Uploaded image as written by the front end.
    pub upload_path: PathBuf,
    pub location: String,
    pub contact: String,
    pub caption: CaptionSource,
}

/// Whether the finder typed a description or asked for one to be generated.
#[derive(Deserialize, Debug, Clone)]
pub enum CaptionSource {
    Manual(String),
    Generated,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LostItemSubmission {
    pub description: String,
    pub contact: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Caption(#[from] CaptionError),
    #[error("failed to store submission: {0}")]
    Repository(#[from] RepositoryError),
    #[error("matching failed: {0}")]
    Matching(#[from] MatchError),
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;
