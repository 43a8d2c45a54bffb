use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use tracing::{info, warn};

use crate::config::Config;
use crate::credentials::load_credentials;
use crate::error::QwenError;
use crate::prompt::{self, PromptSource};
use crate::providers::qwen::{ApiTarget, chat_completion};

const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");
const BANNER: &str = "Qwen Direct API Test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
    Usage,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
            Self::Usage => 2,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Only a broken `out` surfaces as an error.
pub async fn execute<W: Write>(
    client: &Client,
    cfg: &Config,
    args: &[OsString],
    out: &mut W,
) -> Result<RunStatus> {
    let prompt = match prompt::resolve_prompt(args) {
        Ok(Some(prompt)) => prompt,
        Ok(None) => {
            print_usage(out)?;
            return Ok(RunStatus::Usage);
        }
        // Unreadable prompt files abort before the banner, without "Test failed".
        Err(err) => {
            writeln!(out, "{err}").context("Failed to write to stdout")?;
            return Ok(RunStatus::Failed);
        }
    };

    if let PromptSource::File(path) = &prompt.source {
        writeln!(out, "Using content of file '{}' as prompt", path.display())
            .context("Failed to write to stdout")?;
    }
    writeln!(out, "{BANNER}").context("Failed to write to stdout")?;
    writeln!(out, "{}", "=".repeat(20)).context("Failed to write to stdout")?;
    writeln!(out, "Prompt: {}", prompt::preview(&prompt.text))
        .context("Failed to write to stdout")?;

    let status = submit(client, cfg, &prompt.text, out).await?;
    if status == RunStatus::Failed {
        writeln!(out, "\nTest failed").context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(status)
}

async fn submit<W: Write>(
    client: &Client,
    cfg: &Config,
    prompt: &str,
    out: &mut W,
) -> Result<RunStatus> {
    writeln!(out, "Making direct API call to Qwen...").context("Failed to write to stdout")?;

    let target = match load_credentials(&cfg.credentials_path).and_then(|credentials| {
        if credentials.is_expired_at(Utc::now()) {
            warn!(
                expired_at = ?credentials.expires_at(),
                "access token has expired; the API may reject it"
            );
        }
        ApiTarget::from_credentials(&credentials)
    }) {
        Ok(target) => target,
        Err(err) => return report_failure(out, &err),
    };
    writeln!(out, "Using API endpoint: {}", target.endpoint)
        .context("Failed to write to stdout")?;

    match chat_completion(client, cfg, &target, prompt).await {
        Ok(completion) => {
            if let Some(usage) = completion.usage {
                info!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    total_tokens = usage.total_tokens,
                    "token usage"
                );
            }
            writeln!(out, "Response from Qwen:").context("Failed to write to stdout")?;
            writeln!(out, "{}", completion.content).context("Failed to write to stdout")?;
            writeln!(out, "\nDirect API call successful!").context("Failed to write to stdout")?;
            Ok(RunStatus::Success)
        }
        Err(err) => report_failure(out, &err),
    }
}

fn report_failure<W: Write>(out: &mut W, err: &QwenError) -> Result<RunStatus> {
    warn!(error = %err, timed_out = err.is_timeout(), "prompt submission failed");
    writeln!(out, "{err}").context("Failed to write to stdout")?;
    Ok(RunStatus::Failed)
}

fn print_usage<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Usage: {PROGRAM_NAME} \"your prompt here\"")
        .and_then(|_| writeln!(out, "   or: {PROGRAM_NAME} /path/to/file"))
        .context("Failed to write to stdout")
}
