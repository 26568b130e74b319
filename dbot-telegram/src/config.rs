//! Minimal framework config: token, API URL, log path, dispatch mode, allowlist.
//! Loaded from BOT_TOKEN, TELEGRAM_API_URL (or TELOXIDE_API_URL), LOG_FILE,
//! DISPATCH_CONCURRENT, SHUTDOWN_GRACE_SECS and ALLOWED_USER_IDS.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use handler_chain::AppConfig;

const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Telegram transport and dispatch configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub log_file: Option<String>,
    /// Dispatch updates concurrently (default) or strictly one at a time.
    pub concurrent: bool,
    pub shutdown_grace: Duration,
    /// Users allowed to reach the handlers; empty means everyone.
    pub allowed_user_ids: Vec<i64>,
}

impl TelegramConfig {
    /// Loads from environment: BOT_TOKEN required, everything else optional.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Loads from environment; a given `token` overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let mut config = Self::with_token(bot_token);

        config.telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        config.log_file = env::var("LOG_FILE").ok();
        if let Ok(value) = env::var("DISPATCH_CONCURRENT") {
            config.concurrent = value
                .parse()
                .with_context(|| format!("DISPATCH_CONCURRENT must be true or false: {}", value))?;
        }
        if let Ok(value) = env::var("SHUTDOWN_GRACE_SECS") {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("SHUTDOWN_GRACE_SECS must be a number: {}", value))?;
            config.shutdown_grace = Duration::from_secs(secs);
        }
        if let Ok(value) = env::var("ALLOWED_USER_IDS") {
            config.allowed_user_ids = parse_user_ids(&value)?;
        }
        Ok(config)
    }

    /// Builds a config with the given token and defaults for everything else.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            log_file: None,
            concurrent: true,
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
            allowed_user_ids: Vec::new(),
        }
    }

    /// Validate config (telegram_api_url must be a valid URL if set).
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }

    /// Dispatch settings for [`handler_chain::App::with_config`].
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            concurrent: self.concurrent,
            shutdown_grace: self.shutdown_grace,
        }
    }
}

fn parse_user_ids(value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("ALLOWED_USER_IDS contains an invalid user id: {}", s))
        })
        .collect()
}
