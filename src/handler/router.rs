//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: CORS preflight short-circuit,
//! exact-path dispatch over the three routes, and access logging. Each
//! request is handled independently; no state survives it.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};

use super::{convert, index};
use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::logger::AccessLogEntry;

/// Main entry point for HTTP request handling
///
/// Generic over the body type so tests can drive it with in-memory bodies.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let origin = &state.config.http.cors_origin;

    // Preflight must succeed for every route, so it is checked before
    // path dispatch
    let response = if method == Method::OPTIONS {
        http::build_preflight_response(origin)
    } else {
        match (&method, path.as_str()) {
            (&Method::GET, "/") => http::build_html_response(index::get_index_page(), origin),
            (&Method::GET, "/health") => http::build_health_response(origin),
            (_, "/" | "/health") => {
                http::build_405_response("GET, OPTIONS", "Method not allowed. Use GET.", origin)
            }
            (_, "/convert") => convert::handle_convert(req, &state).await,
            _ => http::build_404_response(origin),
        }
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(method.as_str(), &path, query.as_deref());
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    use crate::config::{
        Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, VERSION,
    };

    const SAMPLE_C4: &str =
        "@startuml\nPerson(u, \"U\")\nSystem(s, \"S\")\nRel(u, s, \"Uses\")\n@enduml";

    fn test_state() -> Arc<AppState> {
        test_state_with_max(102_400)
    }

    fn test_state_with_max(max_input_size: u64) -> Arc<AppState> {
        Arc::new(AppState::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
            http: HttpConfig {
                cors_origin: "*".to_string(),
                max_input_size,
            },
        }))
    }

    async fn send(
        method: Method,
        uri: &str,
        body: &str,
        state: &Arc<AppState>,
    ) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        handle_request(req, Arc::clone(state)).await.unwrap()
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_cors(response: &Response<Full<Bytes>>) {
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            "GET, POST, OPTIONS"
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Headers"],
            "Content-Type"
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_with_cors() {
        let state = test_state();
        for method in [Method::GET, Method::POST, Method::DELETE] {
            let response = send(method, "/nope", "", &state).await;
            assert_eq!(response.status(), 404);
            assert_cors(&response);
        }
    }

    #[tokio::test]
    async fn test_options_preflight_on_every_path() {
        let state = test_state();
        for uri in ["/", "/health", "/convert", "/anything"] {
            let response = send(Method::OPTIONS, uri, "", &state).await;
            assert_eq!(response.status(), 200);
            assert_cors(&response);
            assert!(body_string(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_health_reports_status_and_version() {
        let state = test_state();
        let response = send(Method::GET, "/health", "", &state).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_cors(&response);
        let body = body_string(response).await;
        assert_eq!(body, format!("{{\"status\":\"ok\",\"version\":\"{VERSION}\"}}"));
    }

    #[tokio::test]
    async fn test_index_serves_stable_html() {
        let state = test_state();
        let first = send(Method::GET, "/", "", &state).await;
        assert_eq!(first.status(), 200);
        assert_eq!(
            first.headers()["Content-Type"],
            "text/html; charset=utf-8"
        );
        assert_cors(&first);

        let second = send(Method::GET, "/", "", &state).await;
        assert_eq!(body_string(first).await, body_string(second).await);
    }

    #[tokio::test]
    async fn test_wrong_method_on_index_is_405() {
        let state = test_state();
        let response = send(Method::POST, "/", "x", &state).await;
        assert_eq!(response.status(), 405);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_convert_rejects_get() {
        let state = test_state();
        let response = send(Method::GET, "/convert", "", &state).await;
        assert_eq!(response.status(), 405);
        assert_cors(&response);
        assert!(body_string(response).await.contains("Method not allowed"));
    }

    #[tokio::test]
    async fn test_convert_rejects_empty_body() {
        let state = test_state();
        for body in ["", "   \n\t  "] {
            let response = send(Method::POST, "/convert", body, &state).await;
            assert_eq!(response.status(), 400);
            assert_cors(&response);
            assert!(body_string(response).await.contains("Empty input"));
        }
    }

    #[tokio::test]
    async fn test_convert_declared_length_precheck() {
        let state = test_state_with_max(64);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/convert")
            .header("Content-Length", "65")
            .body(Full::new(Bytes::from_static(b"tiny")))
            .unwrap();
        let response = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(response.status(), 413);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_convert_caps_actual_body_despite_header() {
        // Declared length lies; the capped read still catches the overrun
        let state = test_state_with_max(16);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/convert")
            .header("Content-Length", "4")
            .body(Full::new(Bytes::from(
                "System(a, \"A\") and plenty more bytes".to_string(),
            )))
            .unwrap();
        let response = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(response.status(), 413);
    }

    #[tokio::test]
    async fn test_convert_success_is_xml_attachment() {
        let state = test_state();
        let response = send(Method::POST, "/convert", SAMPLE_C4, &state).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Content-Type"], "application/xml");
        assert_eq!(
            response.headers()["Content-Disposition"],
            "attachment; filename=\"diagram.drawio\""
        );
        assert_cors(&response);
        let body = body_string(response).await;
        assert!(body.contains("<mxGraphModel"));
        assert!(body.contains("id=\"node-u\""));
    }

    #[tokio::test]
    async fn test_convert_unparseable_nodesep_falls_back() {
        let state = test_state();
        let with_junk = send(Method::POST, "/convert?nodesep=abc", SAMPLE_C4, &state).await;
        assert_eq!(with_junk.status(), 200);
        let plain = send(Method::POST, "/convert", SAMPLE_C4, &state).await;
        assert_eq!(body_string(with_junk).await, body_string(plain).await);
    }

    #[tokio::test]
    async fn test_convert_invalid_direction_falls_back() {
        let state = test_state();
        let with_junk = send(Method::POST, "/convert?direction=XX", SAMPLE_C4, &state).await;
        assert_eq!(with_junk.status(), 200);
        let plain = send(Method::POST, "/convert", SAMPLE_C4, &state).await;
        assert_eq!(body_string(with_junk).await, body_string(plain).await);
    }

    #[tokio::test]
    async fn test_convert_failure_is_500_with_message() {
        let state = test_state();
        let response = send(Method::POST, "/convert", "definitely not plantuml", &state).await;
        assert_eq!(response.status(), 500);
        assert_cors(&response);
        assert!(body_string(response).await.starts_with("Conversion error:"));
    }
}
