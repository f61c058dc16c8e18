use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", not_found_message(.candidates))]
    CredentialNotFound { candidates: Vec<String> },

    #[error("{}", invalid_message(.location, .multiline))]
    CredentialInvalid { location: PathBuf, multiline: bool },

    #[error("Request failed: {0}")]
    HttpRequestFailed(String),

    #[error("Unexpected response from API: {0}")]
    ResponseShapeUnexpected(String),

    #[error("Failed to write {}: {source}", path.display())]
    FilesystemWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0:#}")]
    Config(#[from] anyhow::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::CredentialNotFound { .. } => 1,
            AppError::HttpRequestFailed(_) => 1,
            AppError::Config(_) => 1,
            AppError::Output(_) => 1,
            AppError::CredentialInvalid { .. } => 2,
            AppError::ResponseShapeUnexpected(_) => 3,
            AppError::FilesystemWriteFailed { .. } => 4,
        }
    }
}

// The request URL carries the API key as a query parameter.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpRequestFailed(err.without_url().to_string())
    }
}

fn not_found_message(candidates: &[String]) -> String {
    let mut message = String::from(
        "Could not find token file! Please make sure it exists in any of these locations, \
         has read permissions and is properly formatted:",
    );
    for candidate in candidates {
        message.push('\n');
        message.push_str(candidate);
    }
    message
}

fn invalid_message(location: &Path, multiline: &bool) -> String {
    let mut message = format!(
        "Gemini token found in {} could not be read, or is not formatted properly.",
        location.display()
    );
    if *multiline {
        message.push_str(
            "\nFile should have only single line. Make sure it has only the token value \
             in first line, nothing else.",
        );
    }
    message
}
