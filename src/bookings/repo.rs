use anyhow::Context;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use super::{
    dto::{BookingResponse, BookingStatus, CreateBookingRequest, FlightDetails},
    reference,
};
use crate::db::is_unique_violation;

const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// Booking row as stored; enums are kept as text.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_details: Json<FlightDetails>,
    pub passengers: i32,
    pub travel_class: String,
    pub price: f64,
    pub status: String,
    pub payment_method: String,
    pub booking_reference: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl BookingRow {
    pub fn status(&self) -> anyhow::Result<BookingStatus> {
        self.status.parse()
    }
}

impl TryFrom<BookingRow> for BookingResponse {
    type Error = anyhow::Error;

    fn try_from(r: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            travel_class: r.travel_class.parse()?,
            status: r.status.parse()?,
            flight_details: r.flight_details.0,
            passengers: r.passengers,
            price: r.price,
            payment_method: r.payment_method,
            booking_reference: r.booking_reference,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Inserts a booking under a fresh reference, drawing a new one when the
/// previous draw collided with an existing booking.
pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    req: &CreateBookingRequest,
) -> anyhow::Result<BookingRow> {
    for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
        let booking_ref = reference::generate(&mut rand::thread_rng());
        let res = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings
                (id, user_id, flight_details, passengers, travel_class, price,
                 status, payment_method, booking_reference)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, flight_details, passengers, travel_class, price,
                      status, payment_method, booking_reference, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(&req.flight_details))
        .bind(req.passengers)
        .bind(req.travel_class.as_str())
        .bind(req.price)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(&req.payment_method)
        .bind(&booking_ref)
        .fetch_one(db)
        .await;

        match res {
            Ok(row) => return Ok(row),
            Err(e) if is_unique_violation(&e) => {
                warn!(attempt, reference = %booking_ref, "booking reference collision");
            }
            Err(e) => return Err(e).context("insert booking"),
        }
    }
    anyhow::bail!("no free booking reference after {MAX_REFERENCE_ATTEMPTS} attempts")
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<BookingRow>> {
    let rows = sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, flight_details, passengers, travel_class, price,
               status, payment_method, booking_reference, created_at, updated_at
          FROM bookings
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list bookings by user")?;
    Ok(rows)
}

pub async fn find_for_user(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<BookingRow>> {
    let row = sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, flight_details, passengers, travel_class, price,
               status, payment_method, booking_reference, created_at, updated_at
          FROM bookings
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get booking")?;
    Ok(row)
}

pub async fn find_by_reference(
    db: &PgPool,
    user_id: Uuid,
    booking_ref: &str,
) -> anyhow::Result<Option<BookingRow>> {
    let row = sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, flight_details, passengers, travel_class, price,
               status, payment_method, booking_reference, created_at, updated_at
          FROM bookings
         WHERE booking_reference = $1 AND user_id = $2
        "#,
    )
    .bind(booking_ref)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get booking by reference")?;
    Ok(row)
}

/// Moves a booking from `from` to `to`. Returns `None` when the row is gone
/// or its status changed underneath us.
pub async fn update_status(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> anyhow::Result<Option<BookingRow>> {
    let row = sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
           SET status = $4, updated_at = now()
         WHERE id = $1 AND user_id = $2 AND status = $3
        RETURNING id, user_id, flight_details, passengers, travel_class, price,
                  status, payment_method, booking_reference, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(db)
    .await
    .context("update booking status")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM bookings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete booking")?;
    Ok(res.rows_affected() > 0)
}
