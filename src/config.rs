use dotenvy::dotenv;
use std::collections::HashSet;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid HOSTING value (expected true|false): {0}")]
    InvalidHosting(String),
    #[error("invalid REPLY_TO_LINKS value (expected true|false): {0}")]
    InvalidReplyToLinks(String),
    #[error("invalid WEBHOOK_URL: {0}")]
    InvalidWebhookUrl(String),
    #[error("invalid OPENAI_BASE_URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid TAGGER_BASE_URL: {0}")]
    InvalidTaggerUrl(String),
    #[error("invalid ALLOWED_CHAT_IDS entry: {0}")]
    InvalidChatIds(String),
    #[error("invalid MAX_TOKENS value: {0}")]
    InvalidMaxTokens(String),
    #[error("invalid RESIZE_WIDTH value: {0}")]
    InvalidResizeWidth(String),
}

pub const DEFAULT_PROMPT: &str =
    "What's in this image? If the image is mostly text, please provide the full text.";
pub const DEFAULT_MESSAGE_PREFIX: &str = "Image Description:";
pub const DEFAULT_QUIET_WORD: &str = "quiet";
pub const DEFAULT_TAG_KEYWORD: &str = "tag";
pub const DEFAULT_ALLOWED_IMAGE_HOST: &str = "https://api.telegram.org";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 300;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub token: String,
    pub openai_api_key: String,
    /// Root of the OpenAI-compatible API, stored without a trailing slash.
    pub openai_base_url: String,
    /// Root of the alternate tag-inference service; tag mode is off when unset.
    pub tagger_base_url: Option<String>,
    /// Unset means every chat is allowed.
    pub allowed_chats: Option<HashSet<i64>>,
    pub default_prompt: String,
    pub max_tokens: u32,
    pub message_prefix: String,
    pub reply_to_links: bool,
    /// If set, messages must contain this token to be processed.
    pub mention_token: Option<String>,
    pub quiet_word: String,
    pub tag_keyword: String,
    /// Exact origin prefix an image URL must start with.
    pub allowed_image_host: String,
    pub resize_width: Option<u32>,
    pub vision_model: String,
    pub hosting: bool,
    pub webhook_url: Option<url::Url>,
    pub port: u16,
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if cfg!(not(test)) {
            let _ = dotenv();
        }

        let token =
            env::var("TELOXIDE_TOKEN").map_err(|_| ConfigError::MissingEnv("TELOXIDE_TOKEN"))?;

        let openai_api_key =
            env::var("OPENAI_API_KEY").map_err(|_| ConfigError::MissingEnv("OPENAI_API_KEY"))?;

        let base_raw =
            env::var("OPENAI_BASE_URL").map_err(|_| ConfigError::MissingEnv("OPENAI_BASE_URL"))?;
        url::Url::parse(&base_raw).map_err(|_| ConfigError::InvalidBaseUrl(base_raw.clone()))?;
        let openai_base_url = base_raw.trim_end_matches('/').to_string();

        let tagger_base_url = match non_empty("TAGGER_BASE_URL") {
            Some(s) => {
                url::Url::parse(&s).map_err(|_| ConfigError::InvalidTaggerUrl(s.clone()))?;
                Some(s.trim_end_matches('/').to_string())
            }
            None => None,
        };

        let allowed_chats = match non_empty("ALLOWED_CHAT_IDS") {
            Some(raw) => {
                let mut ids = HashSet::new();
                for part in raw.split(',') {
                    let part = part.trim();
                    if part.is_empty() {
                        continue;
                    }
                    let id: i64 = part
                        .parse()
                        .map_err(|_| ConfigError::InvalidChatIds(part.to_string()))?;
                    ids.insert(id);
                }
                if ids.is_empty() { None } else { Some(ids) }
            }
            None => None,
        };

        let default_prompt =
            non_empty("STARTING_MESSAGE").unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        let max_tokens = match non_empty("MAX_TOKENS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxTokens(raw))?,
            None => DEFAULT_MAX_TOKENS,
        };

        let message_prefix =
            non_empty("MESSAGE_PREFIX").unwrap_or_else(|| DEFAULT_MESSAGE_PREFIX.to_string());

        let reply_to_links = match non_empty("REPLY_TO_LINKS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidReplyToLinks(raw))?,
            None => true,
        };

        let mention_token = non_empty("MENTION_TOKEN");

        let quiet_word = non_empty("QUIET_WORD").unwrap_or_else(|| DEFAULT_QUIET_WORD.to_string());

        let tag_keyword =
            non_empty("TAG_KEYWORD").unwrap_or_else(|| DEFAULT_TAG_KEYWORD.to_string());

        let allowed_image_host = non_empty("ALLOWED_IMAGE_HOST")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ALLOWED_IMAGE_HOST.to_string());

        let resize_width = match non_empty("RESIZE_WIDTH") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|w| *w > 0)
                    .ok_or(ConfigError::InvalidResizeWidth(raw))?,
            ),
            None => None,
        };

        let vision_model =
            non_empty("VISION_MODEL").unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string());

        let hosting_raw = env::var("HOSTING").map_err(|_| ConfigError::MissingEnv("HOSTING"))?;
        let hosting = parse_bool(&hosting_raw).ok_or(ConfigError::InvalidHosting(hosting_raw))?;

        let webhook_url = match env::var("WEBHOOK_URL") {
            Ok(s) if !s.trim().is_empty() => {
                let parsed =
                    url::Url::parse(&s).map_err(|_| ConfigError::InvalidWebhookUrl(s.clone()))?;
                Some(parsed)
            }
            _ => None,
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080u16);

        Ok(AppConfig {
            token,
            openai_api_key,
            openai_base_url,
            tagger_base_url,
            allowed_chats,
            default_prompt,
            max_tokens,
            message_prefix,
            reply_to_links,
            mention_token,
            quiet_word,
            tag_keyword,
            allowed_image_host,
            resize_width,
            vision_model,
            hosting,
            webhook_url,
            port,
        })
    }

    pub fn chat_allowed(&self, chat_id: i64) -> bool {
        match &self.allowed_chats {
            Some(ids) => ids.contains(&chat_id),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ALL_VARS: &[&str] = &[
        "TELOXIDE_TOKEN",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "TAGGER_BASE_URL",
        "ALLOWED_CHAT_IDS",
        "STARTING_MESSAGE",
        "MAX_TOKENS",
        "MESSAGE_PREFIX",
        "REPLY_TO_LINKS",
        "MENTION_TOKEN",
        "QUIET_WORD",
        "TAG_KEYWORD",
        "ALLOWED_IMAGE_HOST",
        "RESIZE_WIDTH",
        "VISION_MODEL",
        "HOSTING",
        "WEBHOOK_URL",
        "PORT",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    fn set_required() {
        unsafe {
            env::set_var("TELOXIDE_TOKEN", "tok");
            env::set_var("OPENAI_API_KEY", "key");
            env::set_var("OPENAI_BASE_URL", "https://api.example.com/");
            env::set_var("HOSTING", "false");
        }
    }

    #[test]
    #[serial]
    fn from_env_parses_all() {
        clear_env();
        set_required();
        unsafe {
            env::set_var("TAGGER_BASE_URL", "https://tagger.example.com");
            env::set_var("ALLOWED_CHAT_IDS", "-100123, 456");
            env::set_var("MAX_TOKENS", "512");
            env::set_var("MESSAGE_PREFIX", "Desc:");
            env::set_var("REPLY_TO_LINKS", "false");
            env::set_var("MENTION_TOKEN", "@visionbot");
            env::set_var("RESIZE_WIDTH", "768");
            env::set_var("PORT", "1234");
        }

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.token, "tok");
        assert_eq!(cfg.openai_base_url, "https://api.example.com");
        assert_eq!(
            cfg.tagger_base_url.as_deref(),
            Some("https://tagger.example.com")
        );
        let ids = cfg.allowed_chats.clone().unwrap();
        assert!(ids.contains(&-100123) && ids.contains(&456));
        assert_eq!(cfg.max_tokens, 512);
        assert_eq!(cfg.message_prefix, "Desc:");
        assert!(!cfg.reply_to_links);
        assert_eq!(cfg.mention_token.as_deref(), Some("@visionbot"));
        assert_eq!(cfg.resize_width, Some(768));
        assert_eq!(cfg.port, 1234);
        assert!(!cfg.hosting);

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_defaults() {
        clear_env();
        set_required();

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.default_prompt, DEFAULT_PROMPT);
        assert_eq!(cfg.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(cfg.message_prefix, DEFAULT_MESSAGE_PREFIX);
        assert!(cfg.reply_to_links);
        assert!(cfg.mention_token.is_none());
        assert_eq!(cfg.quiet_word, DEFAULT_QUIET_WORD);
        assert_eq!(cfg.tag_keyword, DEFAULT_TAG_KEYWORD);
        assert_eq!(cfg.allowed_image_host, DEFAULT_ALLOWED_IMAGE_HOST);
        assert!(cfg.resize_width.is_none());
        assert_eq!(cfg.vision_model, DEFAULT_VISION_MODEL);
        assert!(cfg.allowed_chats.is_none());
        assert!(cfg.tagger_base_url.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_missing_token() {
        clear_env();
        unsafe {
            env::set_var("OPENAI_API_KEY", "key");
            env::set_var("OPENAI_BASE_URL", "https://api.example.com");
            env::set_var("HOSTING", "false");
        }

        let res = AppConfig::from_env();
        match res {
            Err(ConfigError::MissingEnv("TELOXIDE_TOKEN")) => {}
            other => panic!("expected MissingEnv TELOXIDE_TOKEN, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_bad_chat_ids() {
        clear_env();
        set_required();
        unsafe {
            env::set_var("ALLOWED_CHAT_IDS", "123,abc");
        }

        let res = AppConfig::from_env();
        match res {
            Err(ConfigError::InvalidChatIds(s)) => assert_eq!(s, "abc"),
            other => panic!("expected InvalidChatIds, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn chat_allowed_without_list_allows_all() {
        clear_env();
        set_required();

        let cfg = AppConfig::from_env().unwrap();
        assert!(cfg.chat_allowed(42));
        assert!(cfg.chat_allowed(-100999));

        clear_env();
    }
}
