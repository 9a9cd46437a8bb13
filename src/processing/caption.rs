//! Image captioning through an external inference endpoint.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

use crate::models::config::CaptionerConfig;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("caption request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("caption service answered {0}")]
    Status(reqwest::StatusCode),
    #[error("caption service returned an empty caption")]
    Empty,
}

pub type CaptionResult<T> = Result<T, CaptionError>;

/// Describes what an image shows in a short sentence.
#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    async fn caption(&self, image: &RgbImage) -> CaptionResult<String>;
}

/// Posts PNG-encoded images to a captioning model server.
///
/// The server answers with `{"caption": "..."}`.
pub struct HttpCaptioner {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct CaptionResponse {
    caption: String,
}

impl HttpCaptioner {
    pub fn new(config: &CaptionerConfig) -> CaptionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ImageCaptioner for HttpCaptioner {
    async fn caption(&self, image: &RgbImage) -> CaptionResult<String> {
        let png = encode_png(image)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CaptionError::Status(response.status()));
        }

        let parsed: CaptionResponse = response.json().await?;
        clean_caption(&parsed.caption)
    }
}

fn encode_png(image: &RgbImage) -> CaptionResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Collapses whitespace; captions must carry some text to be matchable.
fn clean_caption(raw: &str) -> CaptionResult<String> {
    let caption = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if caption.is_empty() {
        Err(CaptionError::Empty)
    } else {
        Ok(caption)
    }
}
