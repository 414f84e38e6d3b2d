use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::repo::{self, NewFeedback};
use crate::{
    auth::{services::is_valid_email, AuthUser},
    error::{ApiError, ApiJson},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
}

pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/feedback", post(submit_feedback))
}

/// Trims every text field and checks the form is complete.
fn clean(mut f: NewFeedback) -> Result<NewFeedback, ApiError> {
    f.name = f.name.trim().to_string();
    f.email = f.email.trim().to_lowercase();
    f.subject = f.subject.trim().to_string();
    f.message = f.message.trim().to_string();

    for (field, value) in [
        ("name", &f.name),
        ("subject", &f.subject),
        ("message", &f.message),
    ] {
        if value.is_empty() {
            return Err(ApiError::BadRequest(format!("{field} is required")));
        }
    }
    if !is_valid_email(&f.email) {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if !(1..=5).contains(&f.rating) {
        return Err(ApiError::BadRequest("rating must be between 1 and 5".into()));
    }
    Ok(f)
}

#[instrument(skip(state, user, payload))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    ApiJson(payload): ApiJson<NewFeedback>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let feedback = clean(payload).map_err(|e| {
        warn!(error = %e, "invalid feedback");
        e
    })?;
    let user_id = user.map(|AuthUser(id)| id);

    let id = repo::insert(&state.db, user_id, &feedback).await?;
    info!(feedback_id = %id, rating = feedback.rating, signed_in = user_id.is_some(), "feedback received");

    Ok(Json(FeedbackResponse {
        success: true,
        message: "Thank you for your feedback!".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(rating: i16) -> NewFeedback {
        NewFeedback {
            name: "  Lin ".into(),
            email: " Lin@Example.com ".into(),
            subject: "Seat map".into(),
            message: "Loved the seat picker.".into(),
            rating,
        }
    }

    #[test]
    fn clean_trims_and_accepts() {
        let f = clean(form(5)).unwrap();
        assert_eq!(f.name, "Lin");
        assert_eq!(f.email, "lin@example.com");
    }

    #[test]
    fn clean_rejects_out_of_range_rating() {
        assert!(clean(form(0)).is_err());
        assert!(clean(form(6)).is_err());
    }

    #[test]
    fn clean_rejects_blank_fields() {
        let mut f = form(3);
        f.message = "   ".into();
        let err = clean(f).unwrap_err();
        assert_eq!(err.to_string(), "message is required");
    }
}
