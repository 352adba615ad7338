//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use raffle_core::PaymentInfo;

use crate::auth::MAX_SESSION_TTL_SECONDS;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// PostgreSQL connection string with write access to the entries table.
    /// When absent the service runs on an in-memory store.
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    pub database_max_connections: u32,

    /// Shared admin PIN. When absent every admin call is rejected.
    pub admin_pin: Option<String>,

    /// HMAC secret for admin session tokens.
    pub session_secret: String,

    /// Admin session lifetime in seconds, capped at 30 days.
    pub session_ttl_seconds: u64,

    /// Static payment instructions shown on the public page.
    pub payment: PaymentInfo,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Secrets file structure. Every field falls back to the environment.
#[derive(Debug, Default, Deserialize)]
struct RaffleSecrets {
    #[serde(default)]
    admin_pin: Option<String>,
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    session_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    #[must_use]
    pub fn from_env() -> Self {
        let secrets = load_raffle_secrets();
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            database_url: secrets
                .database_url
                .or_else(|| non_empty_var("DATABASE_URL")),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            admin_pin: secrets.admin_pin.or_else(|| non_empty_var("ADMIN_PIN")),
            session_secret: secrets
                .session_secret
                .or_else(|| non_empty_var("ADMIN_SESSION_SECRET"))
                .unwrap_or(defaults.session_secret),
            session_ttl_seconds: parse_var::<u64>("ADMIN_SESSION_TTL_SECONDS")
                .map_or(defaults.session_ttl_seconds, |ttl| {
                    ttl.min(MAX_SESSION_TTL_SECONDS)
                }),
            payment: PaymentInfo {
                pix_key: std::env::var("PIX_KEY").unwrap_or(defaults.payment.pix_key),
                pix_holder: std::env::var("PIX_HOLDER").unwrap_or(defaults.payment.pix_holder),
                pix_bank: std::env::var("PIX_BANK").unwrap_or(defaults.payment.pix_bank),
            },
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: parse_var("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Load raffle secrets from the first secrets file found.
fn load_raffle_secrets() -> RaffleSecrets {
    let secret_paths = [".secrets/raffle.json", "../.secrets/raffle.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<RaffleSecrets>(path) {
            tracing::info!(path = %path, "Loaded raffle secrets from file");
            return secrets;
        }
    }

    tracing::debug!("Raffle secrets file not found, using environment variables");
    RaffleSecrets::default()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Random per-process session secret, used when none is configured.
///
/// Sessions then do not survive a restart, which only means the admin has to
/// type the PIN again.
fn ephemeral_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: None,
            database_max_connections: 5,
            admin_pin: None,
            session_secret: ephemeral_secret(),
            session_ttl_seconds: 3600,
            payment: PaymentInfo {
                pix_key: "19991318550".into(),
                pix_holder: "Juliet Joyce de Araujo".into(),
                pix_bank: "Nubank".into(),
            },
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
