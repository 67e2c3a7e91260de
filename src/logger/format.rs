//! Access log format module
//!
//! One line per request in common-log style with the elapsed handling time
//! appended.

use chrono::Local;

/// Access log entry covering one handled request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, POST, ...)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: u64,
    /// Request processing time in microseconds
    pub duration_us: u64,
}

impl AccessLogEntry {
    /// Create a new entry stamped with the current time
    pub fn new(method: &str, path: &str, query: Option<&str>) -> Self {
        Self {
            time: Local::now(),
            method: method.to_string(),
            path: path.to_string(),
            query: query.map(ToString::to_string),
            status: 200,
            body_bytes: 0,
            duration_us: 0,
        }
    }

    /// Format as `[time] "METHOD /path?query" status bytes duration`
    pub fn format(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let seconds = self.duration_us as f64 / 1_000_000.0;
        format!(
            "[{}] \"{} {}{}\" {} {} {seconds:.3}s",
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.status,
            self.body_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_includes_request_line_and_status() {
        let mut entry = AccessLogEntry::new("POST", "/convert", Some("direction=LR"));
        entry.status = 200;
        entry.body_bytes = 512;
        entry.duration_us = 2500;

        let line = entry.format();
        assert!(line.contains("\"POST /convert?direction=LR\""));
        assert!(line.contains(" 200 512 "));
        assert!(line.ends_with("0.003s"));
    }

    #[test]
    fn test_format_without_query() {
        let entry = AccessLogEntry::new("GET", "/health", None);
        assert!(entry.format().contains("\"GET /health\""));
    }
}
