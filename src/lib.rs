pub mod cli;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod providers;

use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use config::Config;

pub async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = Config::from_env();
    info!(
        model = %cfg.model,
        temperature = cfg.temperature,
        timeout_secs = cfg.timeout_secs,
        credentials_path = %cfg.credentials_path.display(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let status = cli::execute(&client, &cfg, &args, &mut io::stdout()).await?;
    Ok(status.exit_code())
}
