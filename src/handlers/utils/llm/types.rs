// Payload and response types for the OpenAI-compatible chat-completions API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize, Debug, Clone)]
pub struct RequestMessage {
    pub role: &'static str,
    pub content: MessageBody,
}

impl RequestMessage {
    pub fn system(text: impl Into<String>) -> Self {
        RequestMessage {
            role: "system",
            content: MessageBody::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        RequestMessage {
            role: "user",
            content: MessageBody::Parts(parts),
        }
    }
}

// A system message carries a plain string; a multimodal user message
// carries an array of typed parts.
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum MessageBody {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrlPayload },
}

#[derive(Serialize, Debug, Clone)]
pub struct ImageUrlPayload {
    pub url: String,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

// Top-level chat-completions response. `choices` may be absent; that is
// a defined failure path, not a parse error.
#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    pub choices: Option<Vec<Choice>>,

    // Catch-all for other top-level fields (usage, id, etc.).
    #[serde(flatten)]
    pub other: Value,
}

#[derive(Deserialize, Debug)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,

    // Catch-all for choice-level extras (finish_reason, index, ...).
    #[serde(flatten)]
    pub other: Value,
}

#[derive(Deserialize, Debug)]
pub struct ChoiceMessage {
    pub content: Option<String>,

    #[serde(flatten)]
    pub other: Value,
}

impl ChatCompletionResponse {
    // Text of the first completion, trimmed, if the response carries one.
    pub fn first_choice_text(&self) -> Option<String> {
        let text = self
            .choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_ref()?
            .trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_parts_serialize_in_openai_shape() {
        let msg = RequestMessage::user_parts(vec![
            ContentPart::Text {
                text: "what is this".into(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrlPayload {
                    url: "data:image/png;base64,AAAA".into(),
                },
            },
        ]);

        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["role"], "user");
        assert_eq!(v["content"][0]["type"], "text");
        assert_eq!(v["content"][1]["type"], "image_url");
        assert_eq!(
            v["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn first_choice_text_handles_missing_choices() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(json!({ "error": "overloaded" })).unwrap();
        assert!(resp.first_choice_text().is_none());
    }

    #[test]
    fn first_choice_text_trims_content() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  a cat \n" } }]
        }))
        .unwrap();
        assert_eq!(resp.first_choice_text().as_deref(), Some("a cat"));
    }
}
