// Sends reply chunks as a strict linear chain under the originating message.

use teloxide::{
    prelude::*,
    types::{ChatId, MessageId, ReplyParameters},
};
use thiserror::Error;
use tokio::time::{Duration, sleep};
use tracing::info;

/// Telegram rejects messages longer than this many characters.
pub const MESSAGE_HARD_LIMIT: usize = 4096;

/// Pause between consecutive chunk sends to stay under rate limits.
pub const SEND_DELAY: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
#[error("failed to send reply: {0}")]
pub struct DispatchError(#[from] pub teloxide::RequestError);

/// Seam over the platform send call so the chaining logic is testable
/// without a live bot.
pub trait ReplySender {
    async fn send_reply(
        &self,
        chat_id: ChatId,
        parent: MessageId,
        text: String,
    ) -> Result<MessageId, DispatchError>;
}

impl ReplySender for Bot {
    async fn send_reply(
        &self,
        chat_id: ChatId,
        parent: MessageId,
        text: String,
    ) -> Result<MessageId, DispatchError> {
        let sent = self
            .send_message(chat_id, text)
            .reply_parameters(ReplyParameters::new(parent))
            .await?;
        Ok(sent.id)
    }
}

/// Sends `chunks` in order: the first replies to `origin`, each later
/// chunk replies to the previously sent message. The prefix goes on the
/// first chunk only, every outgoing text is truncated to the platform
/// hard limit, and a fixed delay separates consecutive sends. A send
/// failure drops the remaining chunks of this chain.
pub async fn dispatch_reply_chain<S: ReplySender>(
    sender: &S,
    chat_id: ChatId,
    origin: MessageId,
    chunks: &[String],
    prefix: &str,
    delay: Duration,
) -> Result<(), DispatchError> {
    let mut parent = origin;

    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            sleep(delay).await;
        }

        let text = if i == 0 && !prefix.is_empty() {
            format!("{prefix} {chunk}")
        } else {
            chunk.clone()
        };

        parent = sender
            .send_reply(chat_id, parent, truncate_chars(&text, MESSAGE_HARD_LIMIT))
            .await?;
        info!("Reply chunk {}/{} sent", i + 1, chunks.len());
    }

    Ok(())
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
