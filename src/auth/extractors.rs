use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity for the current request. Rebuilt from the bearer
/// token on every request; never persisted, never read from ambient state.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// The authentication gate. Extracts the bearer token, verifies it and
/// resolves the subject to a user before any handler logic runs. A route is
/// exempt from the gate simply by not taking this extractor (login, health).
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthenticated
        })?;

        // A live token whose user has since been deleted is reported exactly
        // like a bad token; the cause stays invisible to the caller.
        let user = state
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!("token subject has no matching user");
                ApiError::Unauthenticated
            })?;

        Ok(CurrentUser(user.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use time::OffsetDateTime;

    async fn state_with_user(email: &str) -> (AppState, User) {
        let state = AppState::fake();
        let user = User {
            id: Uuid::new_v4(),
            email: email.into(),
            name: "Test Advocate".into(),
            password_hash: "unused".into(),
            role: Role::Advocate,
            created_at: OffsetDateTime::now_utc(),
        };
        state.users.insert(&user).await.unwrap();
        (state, user)
    }

    async fn extract(state: &AppState, header: Option<&str>) -> Result<CurrentUser, ApiError> {
        let mut builder = axum::http::Request::builder().uri("/api/v1/users/me");
        if let Some(value) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn valid_token_resolves_to_principal() {
        let (state, user) = state_with_user("advocate@example.com").await;
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign(&user.email).unwrap();

        let CurrentUser(principal) = extract(&state, Some(&format!("Bearer {token}")))
            .await
            .expect("gate should admit");
        assert_eq!(principal.id, user.id);
        assert_eq!(principal.email, user.email);
        assert_eq!(principal.role, Role::Advocate);
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let (state, _) = state_with_user("advocate@example.com").await;
        let err = extract(&state, None).await.err().expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthenticated() {
        let (state, _) = state_with_user("advocate@example.com").await;
        let err = extract(&state, Some("Basic dXNlcjpwYXNz"))
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let (state, _) = state_with_user("advocate@example.com").await;
        let err = extract(&state, Some("Bearer not.a.jwt"))
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_indistinguishable_from_bad_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        // token is valid but no user exists for the subject
        let token = keys.sign("ghost@example.com").unwrap();

        let err = extract(&state, Some(&format!("Bearer {token}")))
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(err.to_string(), ApiError::Unauthenticated.to_string());
    }
}
