use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::dto::FlightSearchRequest;
use crate::{
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn flight_routes() -> Router<AppState> {
    Router::new().route("/flights/search", post(search_flights))
}

#[instrument(skip(state, payload))]
pub async fn search_flights(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FlightSearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let query = payload.to_query().map_err(|e| {
        warn!(error = %e, "invalid flight search");
        e
    })?;

    let offers = state.amadeus.search_flight_offers(&query).await?;

    let count = offers
        .get("data")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    info!(
        origin = %payload.origin_location_code,
        destination = %payload.destination_location_code,
        offers = count,
        "flight search completed"
    );
    Ok(Json(offers))
}
