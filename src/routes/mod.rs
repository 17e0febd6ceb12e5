//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router: the websocket relay at `/ws`, a health probe, and the
//! browser client served as static files from `STATIC_DIR`. `ServeDir`
//! handles content-type inference by extension and 404s for unmatched
//! paths, so the relay process never crashes on a bad asset request.

pub mod ws;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Resolve the directory holding the browser client assets.
fn static_dir() -> PathBuf {
    std::env::var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"))
}

/// Websocket relay + health probe + static client assets.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(static_dir()).append_index_html_on_directories(true);

    Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
        .fallback_service(assets)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
