use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role a user carries. Roles grant no extra power over insights owned by
/// someone else; ownership is the only mutation axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Advocate,
    ProductManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Advocate => "advocate",
            Role::ProductManager => "product_manager",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advocate" => Ok(Role::Advocate),
            "product_manager" => Ok(Role::ProductManager),
            other => anyhow::bail!("unknown role: {other}"),
        }
    }
}

/// User record as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, never exposed in JSON
    pub role: Role,
    pub created_at: OffsetDateTime,
}
