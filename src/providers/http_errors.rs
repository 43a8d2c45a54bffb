use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::QwenError;

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn classify_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> QwenError {
    if err.is_timeout() || error_chain_matches(&err, ErrorKind::TimedOut, "timed out") {
        return QwenError::Timeout {
            url: api_url.to_string(),
            timeout_secs,
        };
    }

    let message = if err.is_connect() {
        if error_chain_matches(&err, ErrorKind::ConnectionRefused, "connection refused") {
            format!("connection refused by '{api_url}'. Check resource_url in the credentials file.")
        } else {
            format!("failed to connect to '{api_url}'. Check network connectivity.")
        }
    } else {
        format!("request to '{api_url}' failed: {err}")
    };

    QwenError::Transport { message }
}
