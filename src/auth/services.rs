use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::auth::password::verify_password;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::store::UserStore;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Check a presented credential pair against the user store. Unknown email
/// and wrong password are indistinguishable to the caller; on success the
/// caller feeds the user's email to `JwtKeys::sign`.
pub async fn login(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let user = match users.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::BadCredentials);
        }
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::BadCredentials);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::repo_types::Role;
    use crate::store::memory::MemoryUserStore;
    use time::OffsetDateTime;
    use uuid::Uuid;

    async fn store_with_user(email: &str, password: &str) -> MemoryUserStore {
        let store = MemoryUserStore::default();
        let user = User {
            id: Uuid::new_v4(),
            email: email.into(),
            name: "Test Advocate".into(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Advocate,
            created_at: OffsetDateTime::now_utc(),
        };
        store.insert(&user).await.unwrap();
        store
    }

    #[tokio::test]
    async fn login_with_valid_credentials_returns_the_user() {
        let store = store_with_user("advocate@example.com", "password123").await;
        let user = login(&store, "advocate@example.com", "password123")
            .await
            .expect("login should succeed");
        assert_eq!(user.email, "advocate@example.com");
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let store = store_with_user("advocate@example.com", "password123").await;

        let unknown = login(&store, "nope@example.com", "whatever")
            .await
            .err()
            .expect("must fail");
        let wrong = login(&store, "advocate@example.com", "wrongpass")
            .await
            .err()
            .expect("must fail");

        assert!(matches!(unknown, ApiError::BadCredentials));
        assert!(matches!(wrong, ApiError::BadCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn malformed_stored_hash_fails_like_a_wrong_password() {
        let store = MemoryUserStore::default();
        let user = User {
            id: Uuid::new_v4(),
            email: "broken@example.com".into(),
            name: "Broken".into(),
            password_hash: "not-a-valid-hash".into(),
            role: Role::Advocate,
            created_at: OffsetDateTime::now_utc(),
        };
        store.insert(&user).await.unwrap();

        let err = login(&store, "broken@example.com", "anything")
            .await
            .err()
            .expect("must fail");
        assert!(matches!(err, ApiError::BadCredentials));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("advocate@example.com"));
        assert!(!is_valid_email("advocate@example"));
        assert!(!is_valid_email("not-an-email"));
    }
}
