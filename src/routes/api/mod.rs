pub mod scrape;
pub mod settings;

use axum::Router;
use axum::routing::{get, post};

use crate::engine::Engine;

pub fn router(engine: Engine) -> Router {
    let api = Router::new()
        .route("/scrape", post(scrape::scrape))
        .route("/scrape/batch", post(scrape::batch))
        .route("/settings", get(settings::get).put(settings::update))
        .route("/sites", get(settings::sites))
        .with_state(engine);

    Router::new().nest("/api/v1", api)
}
