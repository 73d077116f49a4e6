// Alternate mode: look up a single best tag from the tagging service.

use super::InferenceError;
use crate::handlers::utils::image_fetch::EncodedImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fixed similarity cutoff passed to the tagging service.
pub const TAG_SIMILARITY_THRESHOLD: f32 = 0.4;

#[derive(Serialize, Debug)]
struct TagRequest<'a> {
    image: &'a str,
    threshold: f32,
}

// Extra response fields (score, model info) are ignored.
#[derive(Deserialize, Debug)]
struct TagResponse {
    tag: Option<String>,
}

/// Sends the image to the tagging endpoint and returns its single tag.
pub async fn lookup_tag(
    http: &Client,
    base_url: &str,
    image: &EncodedImage,
) -> Result<String, InferenceError> {
    let body = TagRequest {
        image: &image.base64,
        threshold: TAG_SIMILARITY_THRESHOLD,
    };

    info!("Sending request to the tagging service...");
    let resp = http
        .post(format!("{base_url}/tag"))
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    let parsed: TagResponse = resp.json().await?;

    match parsed.tag.filter(|t| !t.trim().is_empty()) {
        Some(tag) => Ok(tag.trim().to_string()),
        None => Err(InferenceError::Response(
            "tagging response carried no tag".into(),
        )),
    }
}
