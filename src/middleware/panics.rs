//! Last-resort fault boundary.
//!
//! Inner layers propagate failures as [`AppError`](crate::utils::errors::AppError)
//! values; this boundary exists for the truly unexpected. It is mounted
//! outermost so a fault anywhere in the stack — metrics, CORS, a handler —
//! still produces a well-formed response, and the process keeps serving
//! other requests.

use std::any::Any;

use axum::body::Bytes;
use axum::http::{Response, StatusCode, header};
use http_body_util::Full;
use tower_http::catch_panic::CatchPanicLayer;

/// The fixed body for any unrecovered fault. Internal detail goes to the
/// log, never to the caller.
pub const PANIC_BODY: &str =
    r#"{"error":"the server encountered a problem and could not process your request"}"#;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response<Full<Bytes>>;

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Full<Bytes>> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %detail, "recovered from panic while handling request");

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        // The connection may have been abandoned mid-write; make sure the
        // client does not try to reuse it.
        .header(header::CONNECTION, "close")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(PANIC_BODY.as_bytes())))
        .expect("static panic response must build")
}

/// Builds the panic-recovery layer.
pub fn catch_panics() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}
