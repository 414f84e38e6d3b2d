use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{BookingResponse, CreateBookingRequest, Pagination, UpdateStatusRequest},
    reference, repo,
};
use crate::{
    auth::AuthUser,
    db::clamp_limit,
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", get(get_booking).delete(delete_booking))
        .route("/bookings/:id/status", patch(update_booking_status))
        .route("/booking-references/:reference", get(get_booking_by_reference))
}

fn validate(req: &CreateBookingRequest) -> Result<(), ApiError> {
    if req.passengers < 1 {
        return Err(ApiError::BadRequest("passengers must be at least 1".into()));
    }
    if !req.price.is_finite() || req.price < 0.0 {
        return Err(ApiError::BadRequest("price must be a non-negative number".into()));
    }
    Ok(())
}

fn not_found() -> ApiError {
    ApiError::NotFound("Booking not found".into())
}

#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    validate(&payload).map_err(|e| {
        warn!(error = %e, "invalid booking");
        e
    })?;

    let row = repo::create(&state.db, user_id, &payload).await?;
    info!(
        booking_id = %row.id,
        reference = %row.booking_reference,
        %user_id,
        "booking created"
    );
    Ok((StatusCode::CREATED, Json(BookingResponse::try_from(row)?)))
}

#[instrument(skip(state))]
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let rows = repo::list_by_user(
        &state.db,
        user_id,
        clamp_limit(p.limit, 20, 100),
        p.offset.max(0),
    )
    .await?;
    let items = rows
        .into_iter()
        .map(BookingResponse::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let row = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(BookingResponse::try_from(row)?))
}

#[instrument(skip(state))]
pub async fn get_booking_by_reference(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_ref = reference::normalize(&raw).ok_or_else(not_found)?;
    let row = repo::find_by_reference(&state.db, user_id, &booking_ref)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(BookingResponse::try_from(row)?))
}

#[instrument(skip(state, payload))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let current = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(not_found)?;
    let from = current.status()?;
    let to = payload.status;

    if !from.can_transition_to(to) {
        return Err(ApiError::Conflict(format!(
            "Cannot change booking from {from} to {to}"
        )));
    }

    let row = repo::update_status(&state.db, user_id, id, from, to)
        .await?
        .ok_or_else(|| ApiError::Conflict("Booking changed concurrently".into()))?;
    info!(booking_id = %id, %from, %to, "booking status changed");
    Ok(Json(BookingResponse::try_from(row)?))
}

#[instrument(skip(state))]
pub async fn delete_booking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(not_found());
    }
    info!(booking_id = %id, %user_id, "booking deleted");
    Ok(StatusCode::NO_CONTENT)
}
