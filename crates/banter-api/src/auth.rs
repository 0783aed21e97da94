use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use banter_db::{Database, models::{FriendRow, UserRow}, now_ts};
use banter_types::api::{SignupRequest, UserResponse};
use banter_types::models::{FriendSummary, UserProfile};

use crate::error::{ApiError, ApiResult};
use crate::mail::MailTransport;
use crate::middleware::AuthUser;
use crate::session::SessionService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub sessions: SessionService,
    pub mailer: Arc<dyn MailTransport>,
}

/// Account creation. The only place a password is accepted; login itself is
/// OTP-only. On success the new user gets a session cookie right away.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty()
        || req.username.trim().is_empty()
        || req.email.trim().is_empty()
        || req.password.is_empty()
    {
        return Err(ApiError::Validation("All fields are required".into()));
    }

    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_lowercase();

    if state
        .db
        .get_user_by_email(&email)
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let password_hash = hash_secret(&req.password)?;
    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(
            &user_id.to_string(),
            req.name.trim(),
            &username,
            &email,
            &password_hash,
            &now_ts(),
        )
        .map_err(ApiError::Internal)?;

    let token = state.sessions.mint(user_id)?;
    let jar = jar.add(state.sessions.cookie(token));

    let user = load_profile(&state.db, user_id)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserResponse {
            success: true,
            message: "Account created successfully".into(),
            user,
        }),
    ))
}

/// Current-session lookup. Identity comes from the authorization gate; the
/// cookie is never re-checked here.
pub async fn me(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = load_profile(&state.db, user_id)?;

    Ok(Json(UserResponse {
        success: true,
        message: "Authenticated".into(),
        user,
    }))
}

/// Load a user's public profile with friend references resolved to
/// summaries. The password hash stays behind in the row type.
pub(crate) fn load_profile(db: &Database, user_id: Uuid) -> ApiResult<UserProfile> {
    let row = db
        .get_user_by_id(&user_id.to_string())
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let friends = db.get_friends(&row.id).map_err(ApiError::Internal)?;

    Ok(profile_from_row(row, friends))
}

fn profile_from_row(row: UserRow, friends: Vec<FriendRow>) -> UserProfile {
    let friends = friends
        .into_iter()
        .map(|f| FriendSummary {
            id: f.id.parse().unwrap_or_else(|e| {
                warn!("Corrupt friend id '{}': {}", f.id, e);
                Uuid::default()
            }),
            name: f.name,
            email: f.email,
            profile_pic: f.profile_pic,
        })
        .collect();

    UserProfile {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt user id '{}': {}", row.id, e);
            Uuid::default()
        }),
        name: row.name,
        username: row.username,
        email: row.email,
        profile_pic: row.profile_pic,
        about: row.about,
        is_online: row.is_online,
        last_seen: row.last_seen.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
            warn!("Corrupt last_seen '{}' on user '{}': {}", row.last_seen, row.id, e);
            DateTime::default()
        }),
        friends,
    }
}

/// One-way salted hash, shared by passwords and login codes.
pub(crate) fn hash_secret(secret: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("hashing failed: {}", e)))
}

pub(crate) fn verify_secret(secret: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt stored hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
