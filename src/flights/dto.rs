use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::error::ApiError;

/// Search form posted by the client. Field names follow the provider's
/// query parameters so the client can use one vocabulary throughout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default)]
    pub adults: Option<u8>,
    #[serde(default)]
    pub children: Option<u8>,
    #[serde(default)]
    pub infants: Option<u8>,
    #[serde(default)]
    pub travel_class: Option<String>,
    #[serde(default)]
    pub non_stop: Option<bool>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub max_price: Option<u32>,
}

const TRAVEL_CLASSES: [&str; 4] = ["ECONOMY", "PREMIUM_ECONOMY", "BUSINESS", "FIRST"];

fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::BadRequest(format!("{field} must be YYYY-MM-DD")))
}

fn location_code(field: &str, value: &str) -> Result<String, ApiError> {
    let code = value.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::BadRequest(format!(
            "{field} must be a 3-letter IATA code"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

impl FlightSearchRequest {
    /// Validates the form and turns it into the provider's query string,
    /// in a stable order and without the optionals that were left out.
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>, ApiError> {
        let origin = location_code("originLocationCode", &self.origin_location_code)?;
        let destination =
            location_code("destinationLocationCode", &self.destination_location_code)?;
        let departure = parse_date("departureDate", &self.departure_date)?;

        let adults = self.adults.unwrap_or(1);
        if !(1..=9).contains(&adults) {
            return Err(ApiError::BadRequest("adults must be between 1 and 9".into()));
        }

        let mut query = vec![
            ("originLocationCode", origin),
            ("destinationLocationCode", destination),
            ("departureDate", self.departure_date.clone()),
        ];

        if let Some(ret) = self.return_date.as_deref().filter(|d| !d.is_empty()) {
            if parse_date("returnDate", ret)? < departure {
                return Err(ApiError::BadRequest(
                    "returnDate must not be before departureDate".into(),
                ));
            }
            query.push(("returnDate", ret.to_string()));
        }

        query.push(("adults", adults.to_string()));
        if let Some(children) = self.children.filter(|n| *n > 0) {
            query.push(("children", children.to_string()));
        }
        if let Some(infants) = self.infants.filter(|n| *n > 0) {
            query.push(("infants", infants.to_string()));
        }
        if let Some(class) = self.travel_class.as_deref().filter(|c| !c.is_empty()) {
            let class = class.to_ascii_uppercase();
            if !TRAVEL_CLASSES.contains(&class.as_str()) {
                return Err(ApiError::BadRequest(format!(
                    "travelClass must be one of {}",
                    TRAVEL_CLASSES.join(", ")
                )));
            }
            query.push(("travelClass", class));
        }
        if let Some(non_stop) = self.non_stop {
            query.push(("nonStop", non_stop.to_string()));
        }
        if let Some(currency) = self.currency_code.as_deref().filter(|c| !c.is_empty()) {
            query.push(("currencyCode", currency.to_ascii_uppercase()));
        }
        if let Some(max_price) = self.max_price.filter(|p| *p > 0) {
            query.push(("maxPrice", max_price.to_string()));
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> FlightSearchRequest {
        serde_json::from_value(body).expect("valid request json")
    }

    #[test]
    fn minimal_request_defaults_to_one_adult() {
        let req = request(json!({
            "originLocationCode": "icn",
            "destinationLocationCode": "JFK",
            "departureDate": "2025-03-01"
        }));
        let query = req.to_query().unwrap();
        assert_eq!(
            query,
            vec![
                ("originLocationCode", "ICN".to_string()),
                ("destinationLocationCode", "JFK".to_string()),
                ("departureDate", "2025-03-01".to_string()),
                ("adults", "1".to_string()),
            ]
        );
    }

    #[test]
    fn optionals_are_forwarded_in_order() {
        let req = request(json!({
            "originLocationCode": "LHR",
            "destinationLocationCode": "CDG",
            "departureDate": "2025-03-01",
            "returnDate": "2025-03-08",
            "adults": 2,
            "children": 1,
            "infants": 0,
            "travelClass": "business",
            "nonStop": false,
            "currencyCode": "eur",
            "maxPrice": 900
        }));
        let keys: Vec<_> = req.to_query().unwrap().into_iter().collect();
        assert_eq!(
            keys,
            vec![
                ("originLocationCode", "LHR".to_string()),
                ("destinationLocationCode", "CDG".to_string()),
                ("departureDate", "2025-03-01".to_string()),
                ("returnDate", "2025-03-08".to_string()),
                ("adults", "2".to_string()),
                ("children", "1".to_string()),
                ("travelClass", "BUSINESS".to_string()),
                ("nonStop", "false".to_string()),
                ("currencyCode", "EUR".to_string()),
                ("maxPrice", "900".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_bad_location_codes() {
        let req = request(json!({
            "originLocationCode": "Seoul",
            "destinationLocationCode": "JFK",
            "departureDate": "2025-03-01"
        }));
        let err = req.to_query().unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m.contains("originLocationCode")));
    }

    #[test]
    fn rejects_malformed_and_inverted_dates() {
        let bad_format = request(json!({
            "originLocationCode": "ICN",
            "destinationLocationCode": "JFK",
            "departureDate": "03/01/2025"
        }));
        assert!(matches!(bad_format.to_query(), Err(ApiError::BadRequest(_))));

        let inverted = request(json!({
            "originLocationCode": "ICN",
            "destinationLocationCode": "JFK",
            "departureDate": "2025-03-10",
            "returnDate": "2025-03-01"
        }));
        let err = inverted.to_query().unwrap_err();
        assert!(err.to_string().contains("returnDate"));
    }

    #[test]
    fn rejects_out_of_range_adults_and_unknown_class() {
        let zero_adults = request(json!({
            "originLocationCode": "ICN",
            "destinationLocationCode": "JFK",
            "departureDate": "2025-03-01",
            "adults": 0
        }));
        assert!(zero_adults.to_query().is_err());

        let odd_class = request(json!({
            "originLocationCode": "ICN",
            "destinationLocationCode": "JFK",
            "departureDate": "2025-03-01",
            "travelClass": "STEERAGE"
        }));
        assert!(odd_class.to_query().is_err());
    }
}
