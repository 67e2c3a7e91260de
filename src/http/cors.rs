//! CORS header module
//!
//! Every response leaves through `apply`, so browser clients can read
//! success and failure bodies alike. The allowed origin is configurable;
//! methods and headers are fixed by the service surface.

use hyper::http::response::Builder;

/// Methods the service accepts cross-origin
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
/// Request headers the service accepts cross-origin
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Attach the CORS header set to a response under construction
pub fn apply(builder: Builder, origin: &str) -> Builder {
    builder
        .header("Access-Control-Allow-Origin", origin)
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", ALLOWED_HEADERS)
}
