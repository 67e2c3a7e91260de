//! /convert pipeline module
//!
//! Validates the request (method, declared and actual size, non-empty
//! text), parses layout options from the query string, and forwards the
//! body to the conversion capability. Every outcome maps to one HTTP
//! response; nothing is retried.

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Method, Request, Response};

use crate::config::AppState;
use crate::convert;
use crate::http;
use crate::http::query;
use crate::logger;

/// Download filename for the converted diagram
const ATTACHMENT_FILENAME: &str = "diagram.drawio";

/// Handle a request to /convert
pub async fn handle_convert<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let origin = &state.config.http.cors_origin;

    if req.method() != Method::POST {
        return http::build_405_response(
            "POST, OPTIONS",
            "Method not allowed. Use POST with PlantUML text in the request body.",
            origin,
        );
    }

    // Cheap pre-check on the declared length. The declared value is
    // caller-supplied, so the actual read below is capped as well.
    let max_input_size = state.config.http.max_input_size;
    if declared_content_length(req.headers()) > max_input_size {
        return http::build_413_response(max_input_size, origin);
    }

    let options = query::layout_options(req.uri().query());

    let body = match read_body(req.into_body(), max_input_size).await {
        Ok(bytes) => bytes,
        Err(BodyError::TooLarge) => return http::build_413_response(max_input_size, origin),
        Err(BodyError::Read(message)) => {
            logger::log_error(&format!("Failed to read request body: {message}"));
            return http::build_500_response(&format!("Conversion error: {message}"), origin);
        }
    };

    let text = String::from_utf8_lossy(&body);
    if text.trim().is_empty() {
        return http::build_400_response(
            "Empty input: the request body must contain PlantUML text",
            origin,
        );
    }

    match convert::convert(&text, &options) {
        Ok(xml) => http::build_xml_attachment_response(xml, ATTACHMENT_FILENAME, origin),
        Err(e) => {
            logger::log_error(&format!("Conversion failed: {e}"));
            http::build_500_response(&format!("Conversion error: {e}"), origin)
        }
    }
}

/// Declared Content-Length; missing or unparseable values count as 0
fn declared_content_length(headers: &HeaderMap) -> u64 {
    headers
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug)]
enum BodyError {
    TooLarge,
    Read(String),
}

/// Collect the body while enforcing the size cap on the bytes actually read
async fn read_body<B>(body: B, cap: u64) -> Result<Bytes, BodyError>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limited = Limited::new(body, usize::try_from(cap).unwrap_or(usize::MAX));
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<http_body_util::LengthLimitError>().is_some() => {
            Err(BodyError::TooLarge)
        }
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}
