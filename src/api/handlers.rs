//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use super::AppState;
use super::types::{ErrorResponse, PresetInfo, VerticalInfo};
use crate::config::QuoteConfig;
use crate::profiles::Vertical;
use crate::quote::{Quote, QuoteRequest, generate_quote};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Runs the full pipeline on the posted request.
///
/// `POST /quote` → 200 + `Quote` JSON
/// Malformed or invalid input → 400 + `ErrorResponse`
///
/// A request without pricing entries is priced from the server's snapshot.
pub async fn post_quote(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<Quote>, ApiError> {
    let Json(mut request) = body.map_err(|e| bad_request(e.body_text()))?;
    if request.pricing.is_empty() {
        request.pricing = state.pricing.clone();
    }
    generate_quote(&request).map(Json).map_err(bad_request)
}

/// Lists supported verticals with their headline profile figures.
///
/// `GET /verticals` → 200 + `Vec<VerticalInfo>` JSON
pub async fn get_verticals() -> Json<Vec<VerticalInfo>> {
    Json(
        Vertical::ALL
            .iter()
            .map(|v| VerticalInfo::from(v.profile()))
            .collect(),
    )
}

/// Lists built-in presets.
///
/// `GET /presets` → 200 + `Vec<PresetInfo>` JSON
pub async fn get_presets() -> Json<Vec<PresetInfo>> {
    Json(
        QuoteConfig::PRESETS
            .iter()
            .filter_map(|name| {
                QuoteConfig::from_preset(name)
                    .ok()
                    .map(|cfg| PresetInfo::new(name, &cfg))
            })
            .collect(),
    )
}
