use std::num::NonZeroUsize;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::AppError;
use crate::sites::{Layout, Site};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub max_concurrent_browsers: usize,
    pub navigation_timeout_secs: u64,
    pub pipeline_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettings {
    pub max_concurrent_browsers: usize,
}

#[derive(Debug, Serialize)]
pub struct SiteInfo {
    pub source: &'static str,
    pub name: &'static str,
    pub dual_view: bool,
}

fn describe(engine: &Engine) -> SettingsResponse {
    SettingsResponse {
        max_concurrent_browsers: engine.max_concurrent_browsers().get(),
        navigation_timeout_secs: engine.settings().navigation_timeout.as_secs(),
        pipeline_timeout_secs: engine.settings().pipeline_timeout.as_secs(),
    }
}

/// GET /api/v1/settings
pub async fn get(State(engine): State<Engine>) -> Json<SettingsResponse> {
    Json(describe(&engine))
}

/// PUT /api/v1/settings
///
/// Applies to batches started after the update.
pub async fn update(
    State(engine): State<Engine>,
    Json(input): Json<UpdateSettings>,
) -> Result<Json<SettingsResponse>, AppError> {
    let limit = NonZeroUsize::new(input.max_concurrent_browsers)
        .ok_or_else(|| AppError::BadRequest("max_concurrent_browsers must be at least 1".to_string()))?;
    engine.set_max_concurrent_browsers(limit);
    Ok(Json(describe(&engine)))
}

/// GET /api/v1/sites
pub async fn sites() -> Json<Vec<SiteInfo>> {
    Json(
        Site::ALL
            .into_iter()
            .map(|site| SiteInfo {
                source: site.source(),
                name: site.display_name(),
                dual_view: matches!(site.strategy().layout, Layout::DualView(_)),
            })
            .collect(),
    )
}
