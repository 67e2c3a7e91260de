//! HTTP protocol layer module
//!
//! Provides protocol-level helpers decoupled from the routing logic: CORS
//! headers, query-string parsing, and response builders.

pub mod cors;
pub mod query;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_health_response, build_html_response, build_preflight_response,
    build_xml_attachment_response,
};
