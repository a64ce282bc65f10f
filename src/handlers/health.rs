use axum::{Json, extract::State};

use crate::service::directory::HealthReport;
use crate::{AspenError, router::AspenState};

/// GET /api/health -> 503 when storage cannot be reached.
pub async fn health(State(state): State<AspenState>) -> Result<Json<HealthReport>, AspenError> {
    Ok(Json(state.directory.health().await?))
}
