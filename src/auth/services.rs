use lazy_static::lazy_static;
use regex::Regex;

use super::{
    dto::{AuthResponse, PublicUser, UpdateProfileRequest},
    jwt::JwtKeys,
    repo::{ProfileChanges, User},
};
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Signs a fresh access/refresh pair for `user`.
pub fn issue_tokens(keys: &JwtKeys, user: &User) -> anyhow::Result<AuthResponse> {
    Ok(AuthResponse {
        token: keys.sign_access(user.id, &user.role)?,
        refresh_token: keys.sign_refresh(user.id, &user.role)?,
        user: PublicUser::from(user),
    })
}

/// Absent keeps the stored value; a blank string clears it.
fn optional_field(update: Option<String>, current: &Option<String>) -> Option<String> {
    match update {
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(v.trim().to_string()),
        None => current.clone(),
    }
}

/// Applies a partial update on top of the stored profile. Email changes are
/// normalised and validated; uniqueness is left to the caller.
pub fn apply_profile_update(
    current: &User,
    req: UpdateProfileRequest,
) -> Result<ProfileChanges, ApiError> {
    let name = match req.name {
        Some(n) if n.trim().is_empty() => {
            return Err(ApiError::BadRequest("Name must not be empty".into()))
        }
        Some(n) => n.trim().to_string(),
        None => current.name.clone(),
    };

    let email = match req.email {
        Some(e) => {
            let e = normalize_email(&e);
            if !is_valid_email(&e) {
                return Err(ApiError::BadRequest("Invalid email".into()));
            }
            e
        }
        None => current.email.clone(),
    };

    let mut preferences = current.preferences.0.clone();
    if let Some(update) = req.preferences {
        preferences.merge(update);
    }

    Ok(ProfileChanges {
        name,
        email,
        phone: optional_field(req.phone, &current.phone),
        address: optional_field(req.address, &current.address),
        preferences,
    })
}
