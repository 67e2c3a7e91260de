//! HTTP response building module
//!
//! Builders for every response shape the service emits, decoupled from the
//! routing logic. Each builder attaches the CORS header set so browser
//! clients can read failure bodies as well as successes. Builders never
//! panic; a build failure degrades to a bare response and is logged.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Serialize;

use super::cors;
use crate::config::VERSION;
use crate::logger;

/// Payload of GET /health
#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

/// Build the empty 200 response for an OPTIONS preflight
pub fn build_preflight_response(origin: &str) -> Response<Full<Bytes>> {
    cors::apply(Response::builder().status(200), origin)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response(origin: &str) -> Response<Full<Bytes>> {
    plain_text(404, "Not found", origin)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str, message: &str, origin: &str) -> Response<Full<Bytes>> {
    cors::apply(Response::builder().status(405), origin)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", allow)
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from(message.to_string())))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str, origin: &str) -> Response<Full<Bytes>> {
    plain_text(400, message, origin)
}

/// Build 413 Payload Too Large response
pub fn build_413_response(max_input_size: u64, origin: &str) -> Response<Full<Bytes>> {
    plain_text(
        413,
        &format!("Input too large: the limit is {max_input_size} bytes"),
        origin,
    )
}

/// Build 500 Internal Server Error response
pub fn build_500_response(message: &str, origin: &str) -> Response<Full<Bytes>> {
    plain_text(500, message, origin)
}

/// Build the /health JSON response
pub fn build_health_response(origin: &str) -> Response<Full<Bytes>> {
    let payload = HealthStatus {
        status: "ok",
        version: VERSION,
    };
    let json = serde_json::to_string(&payload).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to serialize health payload: {e}"));
        r#"{"status":"ok"}"#.to_string()
    });
    cors::apply(Response::builder().status(200), origin)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String, origin: &str) -> Response<Full<Bytes>> {
    let content_length = content.len();
    cors::apply(Response::builder().status(200), origin)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build the successful /convert response: an XML attachment download
pub fn build_xml_attachment_response(
    xml: String,
    filename: &str,
    origin: &str,
) -> Response<Full<Bytes>> {
    cors::apply(Response::builder().status(200), origin)
        .header("Content-Type", "application/xml")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Full::new(Bytes::from(xml)))
        .unwrap_or_else(|e| {
            log_build_error("XML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Plain-text response with CORS headers
fn plain_text(status: u16, message: &str, origin: &str) -> Response<Full<Bytes>> {
    cors::apply(Response::builder().status(status), origin)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::from(message.to_string())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
