//! # Copydesk - Content Admin Service
//!
//! Copydesk is the content-management backend for a statically generated
//! marketing site. The published site is driven by per-domain JSON documents
//! checked into a Git repository; copydesk edits those documents and the
//! image assets next to them, then commits everything back through the
//! hosting provider's contents API.
//!
//! ## Features
//!
//! - **Schema-driven editing**: declarative field descriptors per content
//!   domain, including generated schemas for variable-length lists
//! - **Path-addressed documents**: every edit flows through a parsed field
//!   path with lazy creation of missing structure
//! - **Image upload queue**: pending uploads with served previews, replaced
//!   per destination, released on save
//! - **Best-effort save-all**: one batch commit of every document and image,
//!   preserving the session untouched on failure
//!
//! ## Architecture
//!
//! - **Domain**: field paths, field schemas, the publish batch format
//! - **Adapters**: session stores, the editor, the repository client, HTTP
//!   handlers
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::api_handler::{self, ApiState};
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(state: ApiState) -> Router {
    let api_router = Router::new()
        // Editor session
        .route("/content", get(api_handler::get_content_overview))
        .route("/content/:slug", get(api_handler::get_content))
        .route("/content/:slug/edit", post(api_handler::apply_edit))
        .route("/content/:slug/list", post(api_handler::apply_list_action))
        .route("/content/:slug/images", post(api_handler::pick_images))
        .route("/schema/:slug", get(api_handler::get_schema))
        .route(
            "/queue",
            get(api_handler::list_queue).delete(api_handler::clear_queue),
        )
        .route("/previews/:token", get(api_handler::get_preview))
        .route("/save", post(api_handler::save_all))
        .route("/status", get(api_handler::get_status))
        // Raw publishing endpoints
        .route("/update-content", post(api_handler::update_content))
        .route("/upload-image", post(api_handler::upload_image))
        .with_state(state);

    let router = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api", api_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
