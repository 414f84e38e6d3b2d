use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials and endpoint for the Amadeus self-service API.
#[derive(Debug, Clone, Deserialize)]
pub struct AmadeusConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    /// Seconds shaved off each token's advertised lifetime.
    pub token_margin_secs: i64,
}

impl AmadeusConfig {
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub amadeus: AmadeusConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "jetsetgo".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "jetsetgo-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let amadeus = AmadeusConfig {
            api_key: std::env::var("AMADEUS_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("AMADEUS_API_SECRET").unwrap_or_default(),
            base_url: std::env::var("AMADEUS_BASE_URL")
                .unwrap_or_else(|_| "https://test.api.amadeus.com".into()),
            token_margin_secs: env_parse("AMADEUS_TOKEN_MARGIN_SECS", 60),
        };
        Ok(Self {
            database_url,
            jwt,
            amadeus,
        })
    }
}

fn env_parse(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}
