/// Database row types — these map directly to SQLite rows.
/// Distinct from banter-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_pic: String,
    pub about: String,
    pub is_online: bool,
    pub last_seen: String,
    pub created_at: String,
}

pub struct FriendRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_pic: String,
}

pub struct LoginCodeRow {
    pub email: String,
    pub code_hash: String,
    /// Unix seconds. Expiry is checked lazily at verification time.
    pub expires_at: i64,
}

pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
    pub created_at: String,
}
