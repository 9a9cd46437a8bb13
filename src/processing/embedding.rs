use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;

use crate::models::config::EmbeddingConfig;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("unknown embedding model {0:?}")]
    UnknownModel(String),
    #[error("failed to initialize embedding model: {0}")]
    Init(String),
    #[error("failed to generate embedding: {0}")]
    Inference(String),
    #[error("embedding model returned no vector")]
    EmptyOutput,
    #[error("embedding model lock poisoned")]
    Poisoned,
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Turns text into a fixed-length vector.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;
}

/// Local ONNX text embedding via fastembed.
///
/// Inference needs exclusive access to the session, so calls are serialized.
pub struct FastTextEmbedder {
    model: Mutex<TextEmbedding>,
}

impl FastTextEmbedder {
    pub fn try_new(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let mut options = InitOptions::new(parse_model(&config.model)?)
            .with_max_length(config.max_length)
            .with_show_download_progress(false);
        if let Some(cache_dir) = &config.cache_dir {
            options = options.with_cache_dir(cache_dir.clone());
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|error| EmbeddingError::Init(format!("{error:?}")))?;

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl TextEmbedder for FastTextEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut model = self.model.lock().map_err(|_| EmbeddingError::Poisoned)?;

        model
            .embed(vec![text], None)
            .map_err(|error| EmbeddingError::Inference(format!("{error:?}")))?
            .into_iter()
            .next()
            .map(|value| normalize_embedding(&value))
            .ok_or(EmbeddingError::EmptyOutput)
    }
}

fn parse_model(name: &str) -> EmbeddingResult<EmbeddingModel> {
    match name.to_ascii_lowercase().as_str() {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        "multilingual-e5-large" => Ok(EmbeddingModel::MultilingualE5Large),
        _ => Err(EmbeddingError::UnknownModel(name.to_string())),
    }
}

/// Normalize a vector to unit length.
///
/// Returns the original vector when the norm is zero.
pub(crate) fn normalize_embedding(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vec.to_vec()
    } else {
        vec.iter().map(|x| x / norm).collect()
    }
}

/// Use a stored embedding when present, otherwise generate and persist it.
///
/// Returns the embedding and a flag indicating whether a new embedding was
/// generated.
pub(crate) fn load_or_generate_embedding<E, F>(
    existing: Option<&[f32]>,
    text: &str,
    embedder: &E,
    persist: F,
) -> EmbeddingResult<(Vec<f32>, bool)>
where
    E: TextEmbedder + ?Sized,
    F: FnOnce(&[f32]),
{
    if let Some(embedding) = existing {
        return Ok((embedding.to_vec(), false));
    }

    let generated = embedder.embed(text)?;
    persist(&generated);

    Ok((generated, true))
}
