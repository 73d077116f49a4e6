// Ordered predicate chain deciding whether an incoming message is processed.

use crate::config::AppConfig;
use teloxide::types::{Me, Message};

/// The slice of an incoming message the filters look at. Extracted from
/// the platform type so each predicate is testable in isolation.
#[derive(Clone, Debug)]
pub struct EventMeta {
    pub from_self: bool,
    pub is_private: bool,
    pub chat_id: i64,
    pub text: String,
}

impl EventMeta {
    pub fn from_message(msg: &Message, me: &Me) -> Self {
        EventMeta {
            from_self: msg
                .from
                .as_ref()
                .map(|u| u.id == me.user.id)
                .unwrap_or(false),
            is_private: msg.chat.is_private(),
            chat_id: msg.chat.id.0,
            text: msg
                .text()
                .or_else(|| msg.caption())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop,
}

pub struct EventFilter {
    pub name: &'static str,
    pub check: fn(&EventMeta, &AppConfig) -> Verdict,
}

fn reject_self(meta: &EventMeta, _cfg: &AppConfig) -> Verdict {
    if meta.from_self {
        Verdict::Stop
    } else {
        Verdict::Continue
    }
}

fn reject_private(meta: &EventMeta, _cfg: &AppConfig) -> Verdict {
    if meta.is_private {
        Verdict::Stop
    } else {
        Verdict::Continue
    }
}

fn require_mention(meta: &EventMeta, cfg: &AppConfig) -> Verdict {
    match &cfg.mention_token {
        Some(token) if !meta.text.contains(token.as_str()) => Verdict::Stop,
        _ => Verdict::Continue,
    }
}

fn require_allowed_chat(meta: &EventMeta, cfg: &AppConfig) -> Verdict {
    if cfg.chat_allowed(meta.chat_id) {
        Verdict::Continue
    } else {
        Verdict::Stop
    }
}

fn reject_quiet_prefix(meta: &EventMeta, cfg: &AppConfig) -> Verdict {
    let text = meta.text.trim_start().to_lowercase();
    if text.starts_with(&cfg.quiet_word.to_lowercase()) {
        Verdict::Stop
    } else {
        Verdict::Continue
    }
}

/// Order matters: cheap identity checks first, content checks last.
pub const FILTER_CHAIN: &[EventFilter] = &[
    EventFilter {
        name: "self-author",
        check: reject_self,
    },
    EventFilter {
        name: "private-chat",
        check: reject_private,
    },
    EventFilter {
        name: "mention-required",
        check: require_mention,
    },
    EventFilter {
        name: "chat-allow-list",
        check: require_allowed_chat,
    },
    EventFilter {
        name: "quiet-prefix",
        check: reject_quiet_prefix,
    },
];

/// Runs the chain; returns the name of the filter that stopped the
/// event, or None when every predicate passed.
pub fn evaluate(meta: &EventMeta, cfg: &AppConfig) -> Option<&'static str> {
    for filter in FILTER_CHAIN {
        if (filter.check)(meta, cfg) == Verdict::Stop {
            return Some(filter.name);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DEFAULT_ALLOWED_IMAGE_HOST, DEFAULT_MAX_TOKENS, DEFAULT_MESSAGE_PREFIX, DEFAULT_PROMPT,
        DEFAULT_QUIET_WORD, DEFAULT_TAG_KEYWORD, DEFAULT_VISION_MODEL,
    };
    use std::collections::HashSet;

    fn test_config() -> AppConfig {
        AppConfig {
            token: "tok".into(),
            openai_api_key: "key".into(),
            openai_base_url: "https://api.example.com".into(),
            tagger_base_url: None,
            allowed_chats: None,
            default_prompt: DEFAULT_PROMPT.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            message_prefix: DEFAULT_MESSAGE_PREFIX.into(),
            reply_to_links: true,
            mention_token: None,
            quiet_word: DEFAULT_QUIET_WORD.into(),
            tag_keyword: DEFAULT_TAG_KEYWORD.into(),
            allowed_image_host: DEFAULT_ALLOWED_IMAGE_HOST.into(),
            resize_width: None,
            vision_model: DEFAULT_VISION_MODEL.into(),
            hosting: false,
            webhook_url: None,
            port: 8080,
        }
    }

    fn meta(text: &str) -> EventMeta {
        EventMeta {
            from_self: false,
            is_private: false,
            chat_id: 42,
            text: text.to_string(),
        }
    }

    #[test]
    fn plain_group_message_passes() {
        assert_eq!(evaluate(&meta("describe this"), &test_config()), None);
    }

    #[test]
    fn own_messages_are_stopped() {
        let mut m = meta("hi");
        m.from_self = true;
        assert_eq!(evaluate(&m, &test_config()), Some("self-author"));
    }

    #[test]
    fn private_chats_are_stopped() {
        let mut m = meta("hi");
        m.is_private = true;
        assert_eq!(evaluate(&m, &test_config()), Some("private-chat"));
    }

    #[test]
    fn mention_required_stops_unmentioned_messages() {
        let mut cfg = test_config();
        cfg.mention_token = Some("@visionbot".into());
        assert_eq!(
            evaluate(&meta("describe this"), &cfg),
            Some("mention-required")
        );
        assert_eq!(evaluate(&meta("@visionbot describe this"), &cfg), None);
    }

    #[test]
    fn allow_list_stops_foreign_chats() {
        let mut cfg = test_config();
        cfg.allowed_chats = Some(HashSet::from([7]));
        assert_eq!(evaluate(&meta("hi"), &cfg), Some("chat-allow-list"));

        let mut m = meta("hi");
        m.chat_id = 7;
        assert_eq!(evaluate(&m, &cfg), None);
    }

    #[test]
    fn quiet_prefix_is_case_insensitive() {
        let cfg = test_config();
        assert_eq!(evaluate(&meta("QUIET please"), &cfg), Some("quiet-prefix"));
        assert_eq!(evaluate(&meta("  Quiet"), &cfg), Some("quiet-prefix"));
        assert_eq!(evaluate(&meta("be quiet later"), &cfg), None);
    }
}
