use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::error::QwenError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub resource_url: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub expiry_date: Option<i64>,
}

impl Credentials {
    pub fn access_token(&self) -> Result<&str, QwenError> {
        self.access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(QwenError::AccessTokenMissing)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.and_then(DateTime::from_timestamp_millis)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }
}

pub fn load_credentials(path: &Path) -> Result<Credentials, QwenError> {
    debug!(path = %path.display(), "loading credentials");
    let raw = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            QwenError::CredentialsMissing {
                path: path.to_path_buf(),
            }
        } else {
            QwenError::CredentialsUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&raw).map_err(|source| QwenError::CredentialsMalformed {
        path: path.to_path_buf(),
        source,
    })
}
