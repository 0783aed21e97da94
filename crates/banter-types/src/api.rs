use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MessageView, UserProfile};

// -- JWT Claims --

/// Session token claims shared between the session service (minting) and the
/// authorization middleware (verification). Canonical definition lives here
/// in banter-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// -- Signup --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

// -- OTP login --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtpVerifyRequest {
    pub email: String,
    pub otp: String,
}

// -- Friends --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddFriendRequest {
    pub friend_id: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub body: String,
}

// -- Response envelopes --

/// `{success, message}` body used for OTP issuance and plain acknowledgements,
/// and (with `success: false`) for every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// `{success, message, user}` body returned by signup, OTP verification and
/// the current-session lookup. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub success: bool,
    pub messages: Vec<MessageView>,
}
