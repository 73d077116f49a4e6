pub mod chat_action_keep_alive;
pub use chat_action_keep_alive::ChatActionKeepAlive;

pub mod chunk_text;
pub use chunk_text::chunk_text;

pub mod image_fetch;
pub use image_fetch::fetch_and_encode;

pub mod image_sources;
pub use image_sources::collect_image_sources;

pub mod reply_chain;
pub use reply_chain::dispatch_reply_chain;

pub mod llm;
