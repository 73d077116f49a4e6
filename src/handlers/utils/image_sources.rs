// Gathers the image attachments (and, optionally, image links) of one message.

use crate::config::AppConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::{prelude::*, types::FileId};
use tracing::error;

/// Attachment filename extensions the pipeline accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// One image to run through the description pipeline.
#[derive(Clone, Debug)]
pub struct ImageSource {
    pub filename: String,
    pub url: String,
}

pub fn has_image_extension(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Collects the message's image attachments in order: a photo (largest
/// size), an image document, an animation, and — when REPLY_TO_LINKS is
/// on — allowed-origin image links found in the text. Telegram file ids
/// are resolved to download URLs via getFile; resolution failures are
/// logged and the source skipped.
pub async fn collect_image_sources(
    bot: &Bot,
    msg: &Message,
    cfg: &AppConfig,
) -> Vec<ImageSource> {
    let mut sources = Vec::new();

    if let Some(sizes) = msg.photo()
        && let Some(largest) = sizes.iter().max_by_key(|p| p.file.size)
        && let Some(url) = resolve_file_url(bot, largest.file.id.clone()).await
    {
        // Photos carry no filename; synthesize one that passes the filter.
        sources.push(ImageSource {
            filename: "photo.jpg".to_string(),
            url,
        });
    }

    if let Some(doc) = msg.document()
        && let Some(name) = doc.file_name.clone()
        && has_image_extension(&name)
        && let Some(url) = resolve_file_url(bot, doc.file.id.clone()).await
    {
        sources.push(ImageSource {
            filename: name,
            url,
        });
    }

    if let Some(anim) = msg.animation()
        && let Some(name) = anim.file_name.clone()
        && has_image_extension(&name)
        && let Some(url) = resolve_file_url(bot, anim.file.id.clone()).await
    {
        sources.push(ImageSource {
            filename: name,
            url,
        });
    }

    if cfg.reply_to_links {
        let text = msg.text().or_else(|| msg.caption()).unwrap_or_default();
        for link in extract_image_links(text, &cfg.allowed_image_host) {
            sources.push(link);
        }
    }

    sources
}

/// Image links in `text` whose origin matches the allowed host prefix.
/// Foreign-origin links are dropped here rather than producing an error
/// reply later.
pub fn extract_image_links(text: &str, allowed_prefix: &str) -> Vec<ImageSource> {
    LINK_RE
        .find_iter(text)
        .filter_map(|m| {
            let raw = m.as_str().trim_end_matches(|c| c == ')' || c == ',' || c == '.');
            if !raw.starts_with(allowed_prefix) {
                return None;
            }
            let parsed = url::Url::parse(raw).ok()?;
            if !has_image_extension(parsed.path()) {
                return None;
            }
            let filename = parsed
                .path_segments()
                .and_then(|mut segs| segs.next_back())
                .unwrap_or("image")
                .to_string();
            Some(ImageSource {
                filename,
                url: raw.to_string(),
            })
        })
        .collect()
}

async fn resolve_file_url(bot: &Bot, file_id: FileId) -> Option<String> {
    match bot.get_file(file_id).send().await {
        Ok(file) => Some(format!(
            "https://api.telegram.org/file/bot{}/{}",
            bot.token(),
            file.path
        )),
        Err(e) => {
            error!("get_file error: {}", e);
            None
        }
    }
}
