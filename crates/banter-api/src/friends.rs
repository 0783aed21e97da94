use axum::{Extension, Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use banter_types::api::{AddFriendRequest, StatusResponse};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;

/// Add a friend reference to the caller's set. Directed: only the caller's
/// side is updated. Duplicate adds are a no-op.
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<AddFriendRequest>,
) -> ApiResult<impl IntoResponse> {
    let friend_id: Uuid = req
        .friend_id
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("friendId must be a valid user id".into()))?;

    if state
        .db
        .get_user_by_id(&friend_id.to_string())
        .map_err(ApiError::Internal)?
        .is_none()
    {
        return Err(ApiError::NotFound("User not found".into()));
    }

    state
        .db
        .add_friend(&user_id.to_string(), &friend_id.to_string())
        .map_err(ApiError::Internal)?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Friend added".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_state;
    use banter_db::now_ts;

    fn seed_user(state: &crate::auth::AppStateInner, username: &str, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        state
            .db
            .create_user(&id.to_string(), username, username, email, "hash", &now_ts())
            .unwrap();
        id
    }

    #[tokio::test]
    async fn add_friend_is_idempotent() {
        let (state, _) = test_state();
        let ann = seed_user(&state, "ann", "a@x.com");
        let bob = seed_user(&state, "bob", "b@x.com");

        for _ in 0..2 {
            add_friend(
                State(state.clone()),
                Extension(AuthUser(ann)),
                Json(AddFriendRequest {
                    friend_id: bob.to_string(),
                }),
            )
            .await
            .unwrap();
        }

        assert_eq!(state.db.get_friends(&ann.to_string()).unwrap().len(), 1);
        // Directed: Bob's side is untouched.
        assert!(state.db.get_friends(&bob.to_string()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_friend_id_is_rejected() {
        let (state, _) = test_state();
        let ann = seed_user(&state, "ann", "a@x.com");

        let err = add_friend(
            State(state),
            Extension(AuthUser(ann)),
            Json(AddFriendRequest {
                friend_id: "not-a-uuid".into(),
            }),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_friend_is_not_found() {
        let (state, _) = test_state();
        let ann = seed_user(&state, "ann", "a@x.com");

        let err = add_friend(
            State(state),
            Extension(AuthUser(ann)),
            Json(AddFriendRequest {
                friend_id: Uuid::new_v4().to_string(),
            }),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
