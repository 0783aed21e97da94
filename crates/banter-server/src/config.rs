use anyhow::{Context, Result};

use banter_api::mail::SmtpConfig;

/// Deployment flavor. Controls cookie hardening: Secure + SameSite=None in
/// production, SameSite=Lax in development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Process configuration, built once in main from the environment and passed
/// explicitly to the services that need it. Request paths never read env
/// vars.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub environment: Environment,
    pub cors_origins: Vec<String>,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var("BANTER_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let jwt_secret = match std::env::var("BANTER_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == Environment::Development => {
                "dev-secret-change-me".to_string()
            }
            Err(_) => anyhow::bail!("BANTER_JWT_SECRET is required in production"),
        };

        let smtp = SmtpConfig {
            host: std::env::var("BANTER_SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            port: std::env::var("BANTER_SMTP_PORT")
                .unwrap_or_else(|_| "587".into())
                .parse()
                .context("invalid BANTER_SMTP_PORT")?,
            username: std::env::var("BANTER_SMTP_USERNAME").ok(),
            password: std::env::var("BANTER_SMTP_PASSWORD").ok(),
            from: std::env::var("BANTER_SMTP_FROM")
                .unwrap_or_else(|_| "Banter <no-reply@banter.local>".into()),
        };

        Ok(Self {
            host: std::env::var("BANTER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("BANTER_PORT")
                .unwrap_or_else(|_| "3015".into())
                .parse()
                .context("invalid BANTER_PORT")?,
            db_path: std::env::var("BANTER_DB_PATH").unwrap_or_else(|_| "banter.db".into()),
            jwt_secret,
            environment,
            cors_origins: std::env::var("BANTER_CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            smtp,
        })
    }
}
