use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::session::SESSION_COOKIE;

/// Identity of the authenticated caller, injected into request extensions by
/// `require_auth`. Handlers take it as a typed `Extension`; no ambient
/// per-request state exists.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// Authorization gate: the single place a session token is checked. Extracts
/// the session cookie, verifies it, and injects the caller's identity. On
/// failure the downstream handler is never invoked.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Authentication("Not authenticated".to_string()))?;

    let user_id = state.sessions.verify(&token)?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_state;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    async fn whoami(Extension(AuthUser(id)): Extension<AuthUser>) -> String {
        id.to_string()
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state, require_auth))
    }

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let (state, _) = test_state();

        let res = app(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (state, _) = test_state();

        let res = app(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, "auth_token=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_cookie_reaches_the_handler() {
        let (state, _) = test_state();
        let user_id = Uuid::new_v4();
        let token = state.sessions.mint(user_id).unwrap();

        let res = app(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, format!("auth_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }
}
