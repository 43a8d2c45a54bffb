use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const USER_AGENT: &str = "QwenCode/1.0.0 (linux; x64)";

const DEFAULT_MODEL: &str = "qwen3-coder-plus";
const DEFAULT_TEMPERATURE: f64 = 0.3;
const MAX_TEMPERATURE: f64 = 2.0;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CREDENTIALS_DIR: &str = ".qwen";
const CREDENTIALS_FILE_NAME: &str = "oauth_creds.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub credentials_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok(), dirs::home_dir())
    }

    fn from_env_with(
        mut get_var: impl FnMut(&str) -> Option<String>,
        home_dir: Option<PathBuf>,
    ) -> Self {
        let credentials_path = non_blank(get_var("QWEN_CREDENTIALS_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                default_credentials_path(home_dir.as_deref().unwrap_or_else(|| Path::new(".")))
            });

        Self {
            model: non_blank(get_var("QWEN_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_temperature(get_var("QWEN_TEMPERATURE").as_deref()),
            timeout_secs: parse_timeout_secs(get_var("QWEN_TIMEOUT_SECS").as_deref()),
            credentials_path,
        }
    }
}

/// `<home>/.qwen/oauth_creds.json`, where the qwen-code login flow stores its tokens.
pub fn default_credentials_path(home_dir: &Path) -> PathBuf {
    home_dir.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE_NAME)
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

fn parse_temperature(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && (0.0..=MAX_TEMPERATURE).contains(value))
        .unwrap_or(DEFAULT_TEMPERATURE)
}
