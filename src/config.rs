//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use crate::client::client::DEFAULT_BASE_URL;
use crate::client::error::ApiError;
use crate::poller::PollPolicy;
use crate::session::{SessionSettings, DEFAULT_FILE, DEFAULT_MODEL};

/// Ask questions about a schedule file through a hosted assistant.
#[derive(Parser)]
#[command(name = "schedule-assistant", version, about, long_about = None)]
pub struct Config {
    /// API key for the assistant service.
    #[arg(long, env = "CHAT_GPT_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Knowledge file uploaded at startup.
    #[arg(long, default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Model the assistant runs on.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the assistant service.
    #[arg(long, env = "ASSISTANT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Delay before the second status check of a run.
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Upper bound for the delay between status checks.
    #[arg(long, default_value_t = 4000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_max_interval_ms: u64,

    /// Give up on a run after this many seconds.
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_timeout_secs: u64,

    /// Log more (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn api_key(&self) -> Result<SecretString, ApiError> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::MissingCredential);
        }
        Ok(SecretString::from(self.api_key.clone()))
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            file_path: self.file.clone(),
            model: self.model.clone(),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(self.poll_interval_ms),
            max_interval: Duration::from_millis(self.poll_max_interval_ms.max(self.poll_interval_ms)),
            timeout: Duration::from_secs(self.poll_timeout_secs),
            ..PollPolicy::default()
        }
    }
}
