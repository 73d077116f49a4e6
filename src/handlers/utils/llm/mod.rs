pub mod types;

pub mod vision;
pub use vision::request_description;

pub mod tagger;
pub use tagger::lookup_tag;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected inference response: {0}")]
    Response(String),
}
