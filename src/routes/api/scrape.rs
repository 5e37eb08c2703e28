use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::Engine;
use crate::error::AppError;
use crate::models::JobOffer;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Value,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub urls: Vec<Value>,
}

/// POST /api/v1/scrape
///
/// Always 200: scrape failures are reported inside the offer.
pub async fn scrape(State(engine): State<Engine>, Json(input): Json<ScrapeRequest>) -> Json<JobOffer> {
    Json(engine.scrape_json(&input.url).await)
}

/// POST /api/v1/scrape/batch
pub async fn batch(
    State(engine): State<Engine>,
    Json(input): Json<BatchRequest>,
) -> Result<Json<Vec<JobOffer>>, AppError> {
    if input.urls.is_empty() {
        return Err(AppError::BadRequest("No URLs provided".to_string()));
    }
    Ok(Json(engine.scrape_batch_json(&input.urls).await))
}
