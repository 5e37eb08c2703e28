pub mod api;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub fn app(engine: Engine) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(api::router(engine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
