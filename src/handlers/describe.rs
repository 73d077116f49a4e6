// Per-attachment pipeline: fetch -> request -> chunk -> dispatch.

use crate::config::AppConfig;
use crate::handlers::utils::{
    chunk_text::{CHUNK_LIMIT, chunk_text},
    image_fetch::fetch_and_encode,
    image_sources::ImageSource,
    llm::{self, InferenceError},
    reply_chain::{ReplySender, SEND_DELAY, dispatch_reply_chain},
};
use reqwest::Client;
use teloxide::types::{ChatId, MessageId};
use tracing::{error, info};

/// Shown when the endpoint answered but carried no usable completion.
pub const FALLBACK_NO_DESCRIPTION: &str = "Failed to obtain a description from the model.";
/// Shown when the fetch or the inference call itself failed.
pub const FALLBACK_ANALYSIS_ERROR: &str = "Error analyzing image with model.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestMode {
    Describe,
    Tag,
}

/// Removes every occurrence of the configured mention token, so a
/// message that was nothing but a mention yields an empty question.
pub fn strip_mention(text: &str, token: Option<&str>) -> String {
    match token {
        Some(t) if !t.is_empty() => text.replace(t, " ").trim().to_string(),
        _ => text.trim().to_string(),
    }
}

/// Tag mode is selected by a leading keyword (case-insensitive) and only
/// when a tagging endpoint is configured.
pub fn select_mode(question: &str, cfg: &AppConfig) -> RequestMode {
    let starts_with_keyword = question
        .trim_start()
        .to_lowercase()
        .starts_with(&cfg.tag_keyword.to_lowercase());
    if starts_with_keyword && cfg.tagger_base_url.is_some() {
        RequestMode::Tag
    } else {
        RequestMode::Describe
    }
}

/// Runs one image source through the whole pipeline. Fetch and inference
/// failures become fixed fallback replies instead of propagating, so one
/// bad attachment never aborts its siblings. Only a reply-send failure
/// cuts this chain short, and that is logged rather than answered.
pub async fn process_image_source<S: ReplySender>(
    http: &Client,
    cfg: &AppConfig,
    sender: &S,
    chat_id: ChatId,
    origin: MessageId,
    source: &ImageSource,
    question: &str,
    mode: RequestMode,
) {
    info!("Processing image source: {}", source.filename);

    let text = match fetch_and_encode(
        http,
        &source.url,
        &cfg.allowed_image_host,
        cfg.resize_width,
    )
    .await
    {
        Ok(image) => {
            let result = match (mode, cfg.tagger_base_url.as_deref()) {
                (RequestMode::Tag, Some(tagger_url)) => {
                    llm::lookup_tag(http, tagger_url, &image).await
                }
                _ => llm::request_description(http, cfg, &image, question).await,
            };

            match result {
                Ok(text) => text,
                Err(InferenceError::Response(reason)) => {
                    error!("Inference response unusable: {}", reason);
                    FALLBACK_NO_DESCRIPTION.to_string()
                }
                Err(InferenceError::Transport(e)) => {
                    error!("Inference call failed: {}", e);
                    FALLBACK_ANALYSIS_ERROR.to_string()
                }
            }
        }
        Err(e) => {
            error!("Image fetch failed for {}: {}", source.filename, e);
            FALLBACK_ANALYSIS_ERROR.to_string()
        }
    };

    let chunks = chunk_text(&text, CHUNK_LIMIT);

    if let Err(e) = dispatch_reply_chain(
        sender,
        chat_id,
        origin,
        &chunks,
        &cfg.message_prefix,
        SEND_DELAY,
    )
    .await
    {
        // Not converted into a further reply; that would itself require a send.
        error!("Reply dispatch failed, dropping remaining chunks: {}", e);
    }
}
