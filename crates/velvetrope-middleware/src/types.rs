//! Common types used throughout the pipeline.
//!
//! This module re-exports the HTTP request and response types used by
//! pipeline stages.

use bytes::Bytes;
use http::header::LOCATION;
use http_body_util::Full;

/// The HTTP request type seen by the pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building the responses stages short-circuit with.
pub trait ResponseExt {
    /// Creates a plain-text response with the given status and message.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON error response in the standard envelope.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;

    /// Creates a temporary (307) redirect to `location`.
    fn redirect(location: &str) -> Response;
}

impl ResponseExt for Response {
    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }

    fn redirect(location: &str) -> Response {
        http::Response::builder()
            .status(http::StatusCode::TEMPORARY_REDIRECT)
            .header(LOCATION, location)
            .body(Full::new(Bytes::new()))
            .expect("failed to build redirect response")
    }
}
