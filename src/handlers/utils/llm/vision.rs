// Builds and issues the vision chat-completion request for one image.

use super::InferenceError;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ContentPart, ImageUrlPayload, RequestMessage,
};
use crate::config::AppConfig;
use crate::handlers::utils::image_fetch::EncodedImage;
use reqwest::Client;
use tracing::info;

const SYSTEM_PROMPT: &str = "You are a vision assistant. You describe images posted in a chat \
and answer questions about them using only what is visible in the image.";

const TEMPERATURE: f32 = 0.2;

/// Picks the prompt for the request: a user question wins over the
/// configured default. The caller strips the bot-mention token first, so
/// a message that was nothing but a mention arrives here empty.
pub fn select_prompt(question: &str, default_prompt: &str) -> String {
    let question = question.trim();
    if question.is_empty() {
        default_prompt.to_string()
    } else {
        format!(
            "Please answer this question about the image. Only output raw information. \
Follow the question exactly.\nUser question: {question}\nPlease repeat the question, \
then answer it."
        )
    }
}

/// Sends the image to the vision endpoint and returns the generated
/// description. A response that arrives but lacks the expected fields is
/// a `Response` error; network/HTTP failures are `Transport`.
pub async fn request_description(
    http: &Client,
    cfg: &AppConfig,
    image: &EncodedImage,
    question: &str,
) -> Result<String, InferenceError> {
    let prompt = select_prompt(question, &cfg.default_prompt);

    let body = ChatCompletionRequest {
        model: cfg.vision_model.clone(),
        messages: vec![
            RequestMessage::system(SYSTEM_PROMPT),
            RequestMessage::user_parts(vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrlPayload {
                        url: image.as_data_uri(),
                    },
                },
            ]),
        ],
        max_tokens: cfg.max_tokens,
        temperature: TEMPERATURE,
    };

    info!("Sending request to the model for image analysis...");
    let resp = http
        .post(format!("{}/v1/chat/completions", cfg.openai_base_url))
        .bearer_auth(&cfg.openai_api_key)
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    let parsed: ChatCompletionResponse = resp.json().await?;
    info!("Received response from the model.");

    parsed
        .first_choice_text()
        .ok_or_else(|| InferenceError::Response("response carried no completion text".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_question_uses_default_prompt() {
        assert_eq!(select_prompt("", "default"), "default");
        assert_eq!(select_prompt("   ", "default"), "default");
    }

    #[test]
    fn question_is_echoed_into_prompt() {
        let p = select_prompt("what color is the car?", "default");
        assert!(p.contains("User question: what color is the car?"));
        assert!(p.contains("repeat the question"));
    }
}
