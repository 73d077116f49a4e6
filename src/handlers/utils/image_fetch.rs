// Downloads an attachment image, normalizes it to PNG, and base64-encodes it.

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, imageops::FilterType};
use reqwest::Client;
use std::io::Cursor;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ImageFetchError {
    #[error("image URL origin not allowed: {0}")]
    InvalidSource(String),
    #[error("image download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("image decode/encode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Image bytes re-encoded to PNG, carried as base64 for transport.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub base64: String,
}

impl EncodedImage {
    pub fn as_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}

/// Fetches `url`, re-encodes the image to PNG (resized to `resize_width`
/// when set), and returns it base64-encoded. The origin check runs
/// before any network access so arbitrary attacker-supplied URLs are
/// never fetched.
pub async fn fetch_and_encode(
    http: &Client,
    url: &str,
    allowed_prefix: &str,
    resize_width: Option<u32>,
) -> Result<EncodedImage, ImageFetchError> {
    if !url.starts_with(allowed_prefix) {
        return Err(ImageFetchError::InvalidSource(url.to_string()));
    }

    let resp = http.get(url).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    info!("Downloaded image ({} bytes)", bytes.len());

    // Decoding and re-encoding are CPU-bound; keep them off the event loop.
    let png = tokio::task::spawn_blocking(move || reencode_png(&bytes, resize_width)).await??;

    Ok(EncodedImage {
        base64: general_purpose::STANDARD.encode(&png),
    })
}

/// Decodes any supported input format and re-encodes to PNG, optionally
/// resizing to `resize_width` with the aspect ratio preserved:
/// new_height = round(width * h0 / w0).
pub(crate) fn reencode_png(
    bytes: &[u8],
    resize_width: Option<u32>,
) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;

    let img = match resize_width {
        Some(w) if w != img.width() => {
            let h = (w as f64 * img.height() as f64 / img.width() as f64).round() as u32;
            img.resize_exact(w, h.max(1), FilterType::Lanczos3)
        }
        _ => img,
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
