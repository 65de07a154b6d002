//! Configuration parsing and validation for the analysis server
//!
//! This module handles command-line argument parsing and validation using clap.
//! It defines the main configuration structure used throughout the application.
use anyhow::anyhow;
use clap::Parser;
use url::Url;

#[derive(Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The port on which the analysis server will listen.
    #[arg(short = 'p', long, default_value_t = 3000)]
    pub port: u16,

    /// The port on which the metrics server will listen.
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,

    /// Whether to enable the metrics endpoint.
    #[arg(short = 'm', long, default_value_t = true)]
    pub metrics: bool,

    /// The prefix to use for metrics.
    #[arg(long, default_value = "redpen")]
    pub metrics_prefix: String,

    /// The Gemini model used for analysis.
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-pro")]
    pub model: String,

    /// Base URL of the Gemini API.
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub base_url: Url,

    /// API key for the Gemini API. The server refuses to start without one.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

impl Config {
    pub fn validate(self) -> Result<Self, anyhow::Error> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("GOOGLE_API_KEY must not be empty"));
        }
        Ok(self)
    }
}

// The whole config is logged at startup, so the key must not appear in Debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("metrics_port", &self.metrics_port)
            .field("metrics", &self.metrics)
            .field("metrics_prefix", &self.metrics_prefix)
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_gemini_api() {
        let config = Config::try_parse_from(["redpen", "--api-key", "k"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.base_url.as_str(),
            "https://generativelanguage.googleapis.com/"
        );
    }

    #[test]
    fn missing_api_key_is_a_parse_error() {
        // Guard against the env var leaking in from the test environment
        if std::env::var("GOOGLE_API_KEY").is_ok() {
            return;
        }
        assert!(Config::try_parse_from(["redpen"]).is_err());
    }

    #[test]
    fn blank_api_key_fails_validation() {
        let config = Config::try_parse_from(["redpen", "--api-key", "   "]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let config = Config::try_parse_from(["redpen", "--api-key", "super-secret"]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
