//! Configuration endpoint

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::server::types::ConfigResponse;

/// GET /api/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        provider: format!("{:?}", state.config.llm.provider).to_lowercase(),
        model: state.decomposer.model().to_string(),
    })
}
