use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use banter_types::api::Claims;

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "auth_token";

const SESSION_TTL_DAYS: i64 = 7;

/// Mints and verifies the signed session token and builds the cookie that
/// carries it. Constructed once at startup with the signing secret; nothing
/// here reads ambient process state. Tokens are stateless, so a session
/// cannot be revoked before its 7-day expiry.
#[derive(Clone)]
pub struct SessionService {
    secret: String,
    cross_site: bool,
}

impl SessionService {
    pub fn new(secret: impl Into<String>, cross_site: bool) -> Self {
        Self {
            secret: secret.into(),
            cross_site,
        }
    }

    pub fn mint(&self, user_id: Uuid) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id,
            exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp()
                as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(e.into()))
    }

    /// Signature and expiry check. Pure: no store access.
    pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Authentication("Invalid or expired token".to_string()))?;

        Ok(data.claims.sub)
    }

    /// HTTP-only session cookie mirroring the token's 7-day lifetime.
    /// Cross-site deployments get SameSite=None + Secure; development gets
    /// SameSite=Lax over plain HTTP.
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .path("/")
            .max_age(time::Duration::days(SESSION_TTL_DAYS))
            .build();

        if self.cross_site {
            cookie.set_same_site(SameSite::None);
            cookie.set_secure(true);
        } else {
            cookie.set_same_site(SameSite::Lax);
        }

        cookie
    }
}
