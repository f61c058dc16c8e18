use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RawReply, Transport};
use crate::config::Config;
use crate::credential::Credential;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

impl GenerateRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Pulls `candidates[0].content.parts[0].text` out of a success body.
pub fn extract_answer(body: &str) -> Result<String, AppError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AppError::ResponseShapeUnexpected(format!("invalid JSON: {}", e)))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            AppError::ResponseShapeUnexpected(
                "missing candidates[0].content.parts[0].text".to_string(),
            )
        })
}

pub struct GeminiClient {
    client: Client,
    api_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

impl Transport for GeminiClient {
    async fn send_prompt(&self, prompt: &str, credential: &Credential) -> Result<RawReply, AppError> {
        let payload = GenerateRequest::from_prompt(prompt);

        tracing::debug!(url = %self.api_url, "sending generateContent request");
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", credential.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%status, bytes = body.len(), "received response");

        Ok(RawReply { status, body })
    }
}
