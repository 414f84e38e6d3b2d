use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Snapshot of the chosen flight, copied from the search result so the
/// booking survives the offer expiring upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub departure_city: String,
    #[serde(default)]
    pub departure_airport: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub departure_date: String,
    #[serde(default)]
    pub arrival_city: String,
    #[serde(default)]
    pub arrival_airport: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub arrival_date: String,
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelClass::Economy => "ECONOMY",
            TravelClass::PremiumEconomy => "PREMIUM_ECONOMY",
            TravelClass::Business => "BUSINESS",
            TravelClass::First => "FIRST",
        }
    }
}

impl FromStr for TravelClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECONOMY" => Ok(TravelClass::Economy),
            "PREMIUM_ECONOMY" => Ok(TravelClass::PremiumEconomy),
            "BUSINESS" => Ok(TravelClass::Business),
            "FIRST" => Ok(TravelClass::First),
            other => anyhow::bail!("unknown travel class {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Only a confirmed booking moves, and only to a terminal state.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => anyhow::bail!("unknown booking status {other:?}"),
        }
    }
}

fn default_passengers() -> i32 {
    1
}

fn default_payment_method() -> String {
    "Credit Card".into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub flight_details: FlightDetails,
    #[serde(default = "default_passengers")]
    pub passengers: i32,
    #[serde(default)]
    pub travel_class: TravelClass,
    pub price: f64,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_details: FlightDetails,
    pub passengers: i32,
    pub travel_class: TravelClass,
    pub price: f64,
    pub status: BookingStatus,
    pub payment_method: String,
    pub booking_reference: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_fills_defaults() {
        let req: CreateBookingRequest = serde_json::from_value(json!({
            "flightDetails": { "airline": "KE", "flightNumber": "KE081" },
            "price": 812.5
        }))
        .unwrap();
        assert_eq!(req.passengers, 1);
        assert_eq!(req.travel_class, TravelClass::Economy);
        assert_eq!(req.payment_method, "Credit Card");
        assert_eq!(req.flight_details.flight_number, "KE081");
        assert_eq!(req.flight_details.arrival_city, "");
    }

    #[test]
    fn enums_use_wire_names() {
        let class: TravelClass = serde_json::from_value(json!("PREMIUM_ECONOMY")).unwrap();
        assert_eq!(class, TravelClass::PremiumEconomy);
        assert_eq!(class.as_str().parse::<TravelClass>().unwrap(), class);

        let status: BookingStatus = serde_json::from_value(json!("cancelled")).unwrap();
        assert_eq!(status.to_string(), "cancelled");
        assert!("refunded".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn status_transitions() {
        use BookingStatus::*;
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
    }
}
