use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use reqwest::{Client, Response};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::token::{TokenCache, TokenResponse};
use crate::{config::AmadeusConfig, error::ApiError};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

/// Client for the Amadeus self-service API. Holds the connection pool and
/// the cached bearer token.
#[derive(Debug)]
pub struct AmadeusClient {
    http: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    tokens: TokenCache,
}

impl AmadeusClient {
    pub fn new(cfg: &AmadeusConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            tokens: TokenCache::new(cfg.token_margin_secs),
        })
    }

    /// Returns a usable bearer token, exchanging credentials when the cached
    /// one is missing or stale.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.tokens.get(OffsetDateTime::now_utc()) {
            return Ok(token);
        }

        let res = self
            .http
            .post(format!("{}{}", self.base_url, TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| unreachable_upstream("Failed to authenticate with Amadeus API", e))?;

        let res = ensure_success(res, "Failed to authenticate with Amadeus API").await?;
        let token: TokenResponse = res
            .json()
            .await
            .context("decode token response")?;

        // A lifetime inside the safety margin is still good for this call;
        // the cache just won't hand it out again.
        let access_token = token.access_token.clone();
        let expires_at = self.tokens.store(token, OffsetDateTime::now_utc());
        info!(%expires_at, "amadeus token refreshed");
        Ok(access_token)
    }

    /// Forwards a validated flight-offer query and returns the provider's
    /// JSON untouched.
    pub async fn search_flight_offers(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<Value, ApiError> {
        let token = self.access_token().await?;
        debug!(params = query.len(), "forwarding flight search");

        let res = self
            .http
            .get(format!("{}{}", self.base_url, FLIGHT_OFFERS_PATH))
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| unreachable_upstream("Failed to search flights", e))?;

        if res.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Revoked upstream before our computed expiry; drop it so the
            // next search exchanges credentials again.
            self.tokens.clear();
        }

        let res = ensure_success(res, "Failed to search flights").await?;
        let body = res.json::<Value>().await.context("decode flight offers")?;
        Ok(body)
    }
}

fn unreachable_upstream(message: &str, err: reqwest::Error) -> ApiError {
    warn!(error = %err, "amadeus request failed");
    ApiError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        message: message.into(),
        details: Value::String(err.to_string()),
    }
}

async fn ensure_success(res: Response, message: &str) -> Result<Response, ApiError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status =
        StatusCode::from_u16(res.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let text = res.text().await.unwrap_or_default();
    let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
    warn!(%status, %details, "{}", message);
    Err(ApiError::Upstream {
        status,
        message: message.into(),
        details,
    })
}
