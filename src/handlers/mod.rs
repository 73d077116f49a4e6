pub mod describe;
pub mod filters;
pub mod utils;

use crate::config::AppConfig;
use describe::{process_image_source, select_mode, strip_mention};
use filters::EventMeta;
use teloxide::{
    prelude::*,
    types::{ChatAction, Me},
};
use tracing::{debug, info};
use utils::{ChatActionKeepAlive, collect_image_sources};

// NOTE: use `Bot` (not `AutoSend<Bot>`) so the code works without enabling
// teloxide's `auto-send` feature in Cargo.toml.
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    me: Me,
    cfg: AppConfig,
    http: reqwest::Client,
) -> ResponseResult<()> {
    let meta = EventMeta::from_message(&msg, &me);

    if let Some(name) = filters::evaluate(&meta, &cfg) {
        debug!("Message in chat {} dropped by filter: {}", meta.chat_id, name);
        return Ok(());
    }

    let sources = collect_image_sources(&bot, &msg, &cfg).await;
    if sources.is_empty() {
        return Ok(());
    }

    info!(
        "Update received: chat_id = {}, {} image source(s)",
        msg.chat.id,
        sources.len()
    );

    let question = strip_mention(&meta.text, cfg.mention_token.as_deref());
    let mode = select_mode(&question, &cfg);

    let mut keep = ChatActionKeepAlive::spawn(bot.clone(), msg.chat.id, ChatAction::Typing, 4);

    // Sources are handled one at a time; a failure inside the pipeline is
    // turned into a fallback reply there and never escapes this handler.
    for source in &sources {
        process_image_source(&http, &cfg, &bot, msg.chat.id, msg.id, source, &question, mode)
            .await;
    }

    keep.shutdown().await;

    Ok(())
}

pub fn get_update_handler() -> teloxide::dispatching::UpdateHandler<teloxide::RequestError> {
    teloxide::types::Update::filter_message()
        .branch(teloxide::dptree::entry().endpoint(handle_message))
}
