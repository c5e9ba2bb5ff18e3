//! Module containing logic related to spawning a logger from the
//! configuration, as well as run-time reloading of the log-level.
use core::str::FromStr;

use derive_more::Display;
use eyre::Report;
use serde::{Deserialize, Serialize};

use crate::{
    parameters::defaults::logger as defaults, Complete, CompleteResult, Emitter, FromEnv,
    FromEnvResult, ParseEnvResult, ReadEnv,
};

/// Log level for reading from environment and (de)serializing
#[derive(
    Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum Level {
    /// Trace
    TRACE,
    /// Debug
    DEBUG,
    /// Info (Default)
    #[default]
    INFO,
    /// Warn
    WARN,
    /// Error
    ERROR,
}

impl FromStr for Level {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::TRACE),
            "DEBUG" => Ok(Self::DEBUG),
            "INFO" => Ok(Self::INFO),
            "WARN" => Ok(Self::WARN),
            "ERROR" => Ok(Self::ERROR),
            other => Err(eyre::eyre!("unknown log level `{other}`")),
        }
    }
}

/// Convert [`Level`] into [`tracing::Level`]
pub fn into_tracing_level(level: Level) -> tracing::Level {
    match level {
        Level::TRACE => tracing::Level::TRACE,
        Level::DEBUG => tracing::Level::DEBUG,
        Level::INFO => tracing::Level::INFO,
        Level::WARN => tracing::Level::WARN,
        Level::ERROR => tracing::Level::ERROR,
    }
}

/// Reflects formatters in `tracing_subscriber::fmt::format`
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// See `tracing_subscriber::fmt::format::Full`
    #[default]
    Full,
    /// See `tracing_subscriber::fmt::format::Compact`
    Compact,
    /// See `tracing_subscriber::fmt::format::Pretty`
    Pretty,
    /// See `tracing_subscriber::fmt::format::Json`
    Json,
}

impl FromStr for Format {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(eyre::eyre!(
                "unknown log format `{other}`, expected one of `full`, `compact`, `pretty`, `json`"
            )),
        }
    }
}

/// 'Logger' configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct UserLayer {
    /// Level of logging verbosity
    pub level: Option<Level>,
    /// Output format
    pub format: Option<Format>,
}

impl UserLayer {
    /// Overlay `other` on top of `self`: values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            level: other.level.or(self.level),
            format: other.format.or(self.format),
        }
    }
}

/// Actual logger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Level of logging verbosity
    pub level: Level,
    /// Output format
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LEVEL,
            format: defaults::DEFAULT_FORMAT,
        }
    }
}

impl Complete for UserLayer {
    type Output = Config;

    fn complete(self) -> CompleteResult<Self::Output> {
        Ok(Config {
            level: self.level.unwrap_or(defaults::DEFAULT_LEVEL),
            format: self.format.unwrap_or(defaults::DEFAULT_FORMAT),
        })
    }
}

impl FromEnv for UserLayer {
    fn from_env(env: &impl ReadEnv) -> FromEnvResult<Self>
    where
        Self: Sized,
    {
        let mut emitter = Emitter::new();

        let level =
            ParseEnvResult::parse_simple(&mut emitter, env, "LOG_LEVEL", "logger.level").into();
        let format =
            ParseEnvResult::parse_simple(&mut emitter, env, "LOG_FORMAT", "logger.format").into();

        emitter.finish()?;

        Ok(Self { level, format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestEnv;

    #[test]
    fn serialize_pretty_format_in_lowercase() {
        let value = Format::Pretty;
        let actual = serde_json::to_string(&value).unwrap();
        assert_eq!("\"pretty\"", actual);
    }

    #[test]
    fn level_and_format_from_env() {
        let env = TestEnv::new()
            .set("LOG_LEVEL", "debug")
            .set("LOG_FORMAT", "json");
        let layer = UserLayer::from_env(&env).unwrap();
        assert_eq!(layer.level, Some(Level::DEBUG));
        assert_eq!(layer.format, Some(Format::Json));
    }

    #[test]
    fn invalid_format_in_env_is_reported() {
        let env = TestEnv::new().set("LOG_FORMAT", "fancy");
        let error = UserLayer::from_env(&env).unwrap_err();
        assert!(error.to_string().contains("logger.format"));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config = UserLayer::default().complete().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(into_tracing_level(config.level), tracing::Level::INFO);
    }
}
