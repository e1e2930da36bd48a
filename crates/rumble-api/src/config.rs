//! Environment configuration, read once at start-up.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rumble_narrative::application::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig};
use rumble_round::RoundTimings;

use crate::error::AppError;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Round lifecycle durations.
    pub timings: RoundTimings,
    /// Narrator endpoint; `None` runs the offline echo narrator.
    pub narrator: Option<OpenAiConfig>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = RoundTimings::default();
        let timings = RoundTimings {
            countdown_secs: parse_or(&lookup, "RUMBLE_COUNTDOWN_SECS", defaults.countdown_secs)?,
            commence_delay: millis_or(&lookup, "RUMBLE_COMMENCE_DELAY_MS", defaults.commence_delay)?,
            line_pacing: millis_or(&lookup, "RUMBLE_LINE_PACING_MS", defaults.line_pacing)?,
            cooldown: millis_or(&lookup, "RUMBLE_COOLDOWN_MS", defaults.cooldown)?,
            narrative_timeout: millis_or(
                &lookup,
                "RUMBLE_NARRATIVE_TIMEOUT_MS",
                defaults.narrative_timeout,
            )?,
        };

        let narrator = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| OpenAiConfig {
                api_key,
                base_url: lookup("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            });

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            timings,
            narrator,
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an invalid host.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, AppError> {
    let fallback = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(lookup, key, fallback).map(Duration::from_millis)
}
