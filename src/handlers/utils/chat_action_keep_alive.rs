// Keeps a chat action (typing / upload_photo) being sent periodically
// while an image works its way through the pipeline.

use teloxide::{prelude::*, types::ChatAction};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{Duration, interval},
};

pub struct ChatActionKeepAlive {
    // Sender to signal the background task to stop.
    stop_tx: Option<oneshot::Sender<()>>,

    // Handle to the spawned Tokio task.
    handle: Option<JoinHandle<()>>,
}

impl ChatActionKeepAlive {
    // Spawn background task that periodically sends the given ChatAction.
    pub fn spawn(bot: Bot, chat_id: ChatId, action: ChatAction, interval_secs: u64) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_secs));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = bot.send_chat_action(chat_id, action).await {
                            tracing::warn!("send_chat_action failed: {:?}", err);
                        }
                    }

                    _ = &mut stop_rx => {
                        break;
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    // Gracefully stop the background task and await its completion.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }

        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// Fallback cleanup to ensure the task is stopped on Drop.
impl Drop for ChatActionKeepAlive {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }

        if let Some(h) = &self.handle {
            h.abort();
        }
    }
}
