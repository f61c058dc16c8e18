mod gemini;

pub use gemini::{extract_answer, GeminiClient};

use reqwest::StatusCode;

use crate::credential::Credential;
use crate::error::AppError;

/// Status and body of the API reply, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: StatusCode,
    pub body: String,
}

/// Sends one prompt to the generative language API.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send_prompt(&self, prompt: &str, credential: &Credential) -> Result<RawReply, AppError>;
}
