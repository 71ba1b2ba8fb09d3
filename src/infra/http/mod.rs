//! Inbound HTTP surface.

pub mod error;
mod metadata;
mod middleware;
mod revalidate;
mod search;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::{facade::ContentApi, seo::SiteSettings};
use crate::config::LiveEnv;

pub use middleware::RequestContext;
pub use revalidate::{RevalidateRequest, RevalidateResponse};
pub use search::SearchRequest;

#[derive(Clone)]
pub struct AppState {
    pub content: ContentApi,
    /// Site settings resolved at startup; `env` may override the URL per request.
    pub site: Arc<SiteSettings>,
    pub env: LiveEnv,
    /// Revalidation is disabled when unset.
    pub revalidate_token: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search::search))
        .route("/api/posts/{slug}/metadata", get(metadata::post_metadata))
        .route("/api/revalidate", post(revalidate::revalidate))
        .route("/_health", get(health))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::security_headers))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn health() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
