use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user account. The stored password hash is deliberately
/// absent from this type, so it cannot reach a response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub profile_pic: String,
    pub about: String,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    pub friends: Vec<FriendSummary>,
}

/// Reduced profile used when resolving a user's friend list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_pic: String,
}

/// One direct message as seen by a conversation participant. `is_sender` is
/// computed from the viewpoint of the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub is_sender: bool,
    pub created_at: DateTime<Utc>,
}
