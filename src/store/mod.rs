use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::insights::repo_types::{Insight, Source};

pub mod memory;
pub mod postgres;

/// User lookup capability consumed by login and the authentication gate.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup; emails are case-sensitive keys.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Used by seed provisioning only; users are never created per request.
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
}

/// Insight persistence capability. Mutating calls are expected to be atomic
/// per row on the store side; this layer holds no locks.
#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Insight>>;

    async fn insert(&self, insight: &Insight) -> anyhow::Result<()>;

    /// `None` means the row was gone by write time (e.g. a concurrent
    /// delete won the race).
    async fn update(&self, insight: &Insight) -> anyhow::Result<Option<Insight>>;

    /// `false` means the row was already gone.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Newest first by creation time. The total is independent of the page
    /// requested.
    async fn list_recent(&self, limit: i64, offset: i64)
        -> anyhow::Result<(Vec<Insight>, i64)>;

    async fn count(&self) -> anyhow::Result<i64>;

    /// Insights with no source are excluded.
    async fn count_by_source(&self) -> anyhow::Result<Vec<(Source, i64)>>;

    async fn count_by_author(&self) -> anyhow::Result<Vec<(Uuid, i64)>>;

    /// Counts rows with `start <= created_at < end`.
    async fn count_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<i64>;
}
