//! Environment configuration for the terminal host.

use std::time::Duration;

use url::Url;

use crate::error::AppError;

const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;
const DEFAULT_NARRATION_TIMEOUT_SECS: u64 = 600;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Settings read at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the story API.
    pub api_url: Url,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Upper bound on a single narration playback.
    pub narration_timeout: Duration,
    /// Start with sound muted.
    pub muted: bool,
    /// Log output format.
    pub log_format: LogFormat,
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, applying defaults for unset
    /// or blank variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = var("QUESTLINE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = Url::parse(api_url.trim())
            .map_err(|e| AppError::Config(format!("QUESTLINE_API_URL must be a valid URL: {e}")))?;

        let request_timeout = secs(
            "QUESTLINE_REQUEST_TIMEOUT_SECS",
            var("QUESTLINE_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let narration_timeout = secs(
            "QUESTLINE_NARRATION_TIMEOUT_SECS",
            var("QUESTLINE_NARRATION_TIMEOUT_SECS"),
            DEFAULT_NARRATION_TIMEOUT_SECS,
        )?;

        let muted = match var("QUESTLINE_MUTED").as_deref().map(str::trim) {
            None => false,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "QUESTLINE_MUTED must be a boolean, got {other:?}"
                )));
            }
        };

        let log_format = match var("QUESTLINE_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "QUESTLINE_LOG_FORMAT must be pretty or json, got {other:?}"
                )));
            }
        };

        Ok(Self {
            api_url,
            request_timeout,
            narration_timeout,
            muted,
            log_format,
        })
    }
}

fn secs(key: &str, raw: Option<String>, default: u64) -> Result<Duration, AppError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::Config(format!("{key} must be greater than zero"))),
        Ok(value) => Ok(Duration::from_secs(value)),
        Err(e) => Err(AppError::Config(format!(
            "{key} must be a whole number of seconds: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ClientConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_nothing_is_set() {
        // Arrange / Act
        let config = config_from(&[]).unwrap();

        // Assert
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(config.request_timeout, Duration::from_secs(180));
        assert_eq!(config.narration_timeout, Duration::from_secs(600));
        assert!(!config.muted);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_values_override_defaults() {
        let config = config_from(&[
            ("QUESTLINE_API_URL", "https://stories.example.com/api/"),
            ("QUESTLINE_REQUEST_TIMEOUT_SECS", "30"),
            ("QUESTLINE_MUTED", "true"),
            ("QUESTLINE_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.api_url.host_str(), Some("stories.example.com"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.muted);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("QUESTLINE_API_URL", "  "), ("QUESTLINE_MUTED", "")]).unwrap();

        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert!(!config.muted);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for vars in [
            [("QUESTLINE_API_URL", "not a url")],
            [("QUESTLINE_REQUEST_TIMEOUT_SECS", "soon")],
            [("QUESTLINE_NARRATION_TIMEOUT_SECS", "0")],
            [("QUESTLINE_MUTED", "maybe")],
            [("QUESTLINE_LOG_FORMAT", "xml")],
        ] {
            let result = config_from(&vars);
            assert!(
                matches!(result, Err(AppError::Config(_))),
                "{vars:?} should be rejected"
            );
        }
    }
}
