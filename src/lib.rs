//! Image frontend: upload and view pages for an external image hosting API.
//!
//! Page state is computed by the upload and view controllers and rendered on
//! the server; the embedded scripts only bind browser events.

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod frontend;
pub mod http;
pub mod logging;
pub mod pages;
pub mod upload;
pub mod version;
pub mod view;

#[cfg(test)]
mod testing;

use axum::extract::{DefaultBodyLimit, Extension};
use axum::http::Request;
use axum::routing::{get, post};
use axum::{Router, middleware};
use shadow_rs::shadow;
use std::sync::Arc;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info_span};

use crate::api::HttpImageApi;
use crate::config::FrontendConfig;

shadow!(build);

/// Builds the page router with configuration and API client attached.
pub fn build_router(
    config: Arc<FrontendConfig>,
    api: Arc<HttpImageApi>,
    max_upload_size: usize,
) -> Router {
    Router::new()
        .route("/", get(upload::upload_page))
        .route("/index.html", get(upload::upload_page))
        .route(
            "/upload",
            post(upload::submit_upload).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/image.html", get(view::view_page))
        .route("/version", get(version::get_version_info))
        .route("/assets/{*path}", get(frontend::serve_asset))
        .route("/{id}", get(view::view_page))
        .layer(middleware::from_fn(http::add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(config))
        .layer(Extension(api))
}
