use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use banter_types::api::{OtpRequest, OtpVerifyRequest, StatusResponse, UserResponse};
use banter_types::models::UserProfile;

use crate::auth::{AppState, AppStateInner, hash_secret, load_profile, verify_secret};
use crate::error::{ApiError, ApiResult};

const CODE_TTL_SECS: i64 = 5 * 60;

/// Login challenge issuance. Returns `{success, message}` only; the session
/// is deferred to successful verification.
pub async fn request_code(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> ApiResult<impl IntoResponse> {
    issue_challenge(&state, &req.email).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Login code sent".into(),
    }))
}

/// Login challenge verification. A correct, live code consumes the challenge
/// and logs the user in with a fresh session cookie.
pub async fn verify_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<OtpVerifyRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = verify_challenge(&state, &req.email, &req.otp).await?;

    let token = state.sessions.mint(user.id)?;
    let jar = jar.add(state.sessions.cookie(token));

    Ok((
        jar,
        Json(UserResponse {
            success: true,
            message: "Logged in successfully".into(),
            user,
        }),
    ))
}

/// Issue a fresh challenge for `email`: supersede any live code, persist the
/// hashed code with a 5-minute deadline, dispatch the plaintext code by
/// mail. Login requires a pre-existing account, so an unknown email fails.
pub async fn issue_challenge(state: &AppStateInner, email: &str) -> ApiResult<()> {
    if email.trim().is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }
    let email = email.trim().to_lowercase();

    if state
        .db
        .get_user_by_email(&email)
        .map_err(ApiError::Internal)?
        .is_none()
    {
        return Err(ApiError::NotFound("No account with that email".into()));
    }

    let code = generate_code();
    let code_hash = hash_secret(&code)?;
    let expires_at = Utc::now().timestamp() + CODE_TTL_SECS;

    state
        .db
        .replace_login_code(&email, &code_hash, expires_at)
        .map_err(ApiError::Internal)?;

    // Mail failure aborts the challenge; there is no queued retry. The row
    // left behind is superseded by the next issuance.
    state
        .mailer
        .send_login_code(&email, &code)
        .await
        .map_err(ApiError::Internal)?;

    debug!("Issued login challenge for {}", email);
    Ok(())
}

/// Walk the challenge through its terminal states: missing, expired, invalid
/// or verified. A verified code is deleted before the session is minted, so
/// it can never be replayed.
pub async fn verify_challenge(
    state: &AppStateInner,
    email: &str,
    code: &str,
) -> ApiResult<UserProfile> {
    if email.trim().is_empty() || code.trim().is_empty() {
        return Err(ApiError::Validation("Email and code are required".into()));
    }
    let email = email.trim().to_lowercase();

    let record = state
        .db
        .get_login_code(&email)
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("No active login code for this email".into()))?;

    // Expiry is checked here, not swept in the background.
    if Utc::now().timestamp() > record.expires_at {
        state
            .db
            .delete_login_codes(&email)
            .map_err(ApiError::Internal)?;
        return Err(ApiError::Expired("Login code has expired".into()));
    }

    if !verify_secret(code.trim(), &record.code_hash)? {
        return Err(ApiError::InvalidCredential("Incorrect login code".into()));
    }

    // Single use: consume before handing out a session.
    state
        .db
        .delete_login_codes(&email)
        .map_err(ApiError::Internal)?;

    let user = state
        .db
        .get_user_by_email(&email)
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}'", user.id)))?;

    load_profile(&state.db, user_id)
}

/// Uniformly random 6-digit numeric code, zero-padded.
fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}
