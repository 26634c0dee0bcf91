use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::repo_types::{Role, User};
use crate::store::UserStore;

const SEED_USERS: &[(&str, &str, Role)] = &[
    ("advocate@example.com", "Test Advocate", Role::Advocate),
    ("pm@example.com", "Test PM", Role::ProductManager),
];

/// Insert the default development users when they are missing. Runs once at
/// startup; users are never provisioned per request.
pub async fn seed_users(users: &dyn UserStore, password: &str) -> anyhow::Result<()> {
    let hash = hash_password(password)?;
    for (email, name, role) in SEED_USERS {
        if users.find_by_email(email).await?.is_some() {
            continue;
        }
        let user = User {
            id: Uuid::new_v4(),
            email: (*email).to_owned(),
            name: (*name).to_owned(),
            password_hash: hash.clone(),
            role: *role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(&user).await?;
        info!(email = %user.email, role = %user.role.as_str(), "seeded user");
    }
    Ok(())
}
