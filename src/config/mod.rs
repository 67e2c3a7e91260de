// Configuration module entry point
// Loads layered configuration: defaults, optional config.toml, env overrides

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Service version reported by /health
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default maximum /convert input size in bytes (100 KiB)
pub const DEFAULT_MAX_INPUT_SIZE: i64 = 102_400;

impl Config {
    /// Load configuration from "config.toml" plus environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; defaults cover every key. `CORS_ORIGIN` and
    /// `MAX_INPUT_SIZE` environment variables override the file values.
    /// A `MAX_INPUT_SIZE` that is not a positive integer is ignored.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.cors_origin", "*")?
            .set_default("http.max_input_size", DEFAULT_MAX_INPUT_SIZE)?
            .set_override_option("http.cors_origin", std::env::var("CORS_ORIGIN").ok())?
            .set_override_option(
                "http.max_input_size",
                parse_max_input_size(std::env::var("MAX_INPUT_SIZE").ok().as_deref()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Parse a `MAX_INPUT_SIZE` environment value
///
/// Only positive integers are accepted; anything else leaves the configured
/// default in place.
fn parse_max_input_size(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse::<i64>().ok().filter(|size| *size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_input_size_accepts_positive_integer() {
        assert_eq!(parse_max_input_size(Some("4096")), Some(4096));
        assert_eq!(parse_max_input_size(Some(" 1 ")), Some(1));
    }

    #[test]
    fn test_max_input_size_rejects_junk() {
        assert_eq!(parse_max_input_size(Some("abc")), None);
        assert_eq!(parse_max_input_size(Some("12kb")), None);
        assert_eq!(parse_max_input_size(Some("")), None);
    }

    #[test]
    fn test_max_input_size_rejects_non_positive() {
        assert_eq!(parse_max_input_size(Some("0")), None);
        assert_eq!(parse_max_input_size(Some("-5")), None);
    }

    #[test]
    fn test_max_input_size_absent() {
        assert_eq!(parse_max_input_size(None), None);
    }
}
