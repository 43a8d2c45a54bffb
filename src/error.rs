use std::path::PathBuf;

use thiserror::Error;

// Display text is printed verbatim to stdout.
#[derive(Debug, Error)]
pub enum QwenError {
    #[error(
        "No credentials found at '{}'. Please authenticate with qwen-code first.",
        .path.display()
    )]
    CredentialsMissing { path: PathBuf },

    #[error("Error loading credentials from '{}': {source}", .path.display())]
    CredentialsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error loading credentials from '{}': {source}", .path.display())]
    CredentialsMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No access token found in credentials.")]
    AccessTokenMissing,

    #[error("Error reading file '{}': {source}", .path.display())]
    PromptUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API call to '{url}' timed out after {timeout_secs}s.")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Error making API call: {message}")]
    Transport { message: String },

    #[error("API call failed with status code: {status}\n{body}")]
    Status { status: u16, body: String },

    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
}

impl QwenError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
