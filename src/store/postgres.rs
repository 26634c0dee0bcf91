use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{InsightStore, UserStore};
use crate::auth::repo_types::{Role, User};
use crate::insights::repo_types::{Insight, Source};

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

pub struct PgInsightStore {
    db: PgPool,
}

impl PgInsightStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// Enums are stored as TEXT; rows carry the raw string and are converted on
// the way out so an unknown value surfaces as an error instead of a panic.

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct InsightRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    description: String,
    source: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<InsightRow> for Insight {
    type Error = anyhow::Error;

    fn try_from(row: InsightRow) -> Result<Self, Self::Error> {
        Ok(Insight {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            description: row.description,
            source: row.source.as_deref().map(Source::from_str).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";
const INSIGHT_COLUMNS: &str = "id, author_id, title, description, source, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl InsightStore for PgInsightStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Insight>> {
        let row = sqlx::query_as::<_, InsightRow>(&format!(
            "SELECT {INSIGHT_COLUMNS} FROM insights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Insight::try_from).transpose()
    }

    async fn insert(&self, insight: &Insight) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO insights (id, author_id, title, description, source, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(insight.id)
        .bind(insight.author_id)
        .bind(&insight.title)
        .bind(&insight.description)
        .bind(insight.source.map(|s| s.as_str()))
        .bind(insight.created_at)
        .bind(insight.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update(&self, insight: &Insight) -> anyhow::Result<Option<Insight>> {
        let row = sqlx::query_as::<_, InsightRow>(&format!(
            r#"
            UPDATE insights
            SET title = $2, description = $3, source = $4, updated_at = $5
            WHERE id = $1
            RETURNING {INSIGHT_COLUMNS}
            "#
        ))
        .bind(insight.id)
        .bind(&insight.title)
        .bind(&insight.description)
        .bind(insight.source.map(|s| s.as_str()))
        .bind(insight.updated_at)
        .fetch_optional(&self.db)
        .await?;
        row.map(Insight::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM insights WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<Insight>, i64)> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM insights")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, InsightRow>(&format!(
            r#"
            SELECT {INSIGHT_COLUMNS} FROM insights
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let items = rows
            .into_iter()
            .map(Insight::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM insights")
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }

    async fn count_by_source(&self) -> anyhow::Result<Vec<(Source, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT source, COUNT(*) FROM insights
            WHERE source IS NOT NULL
            GROUP BY source
            ORDER BY source
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        rows.into_iter()
            .map(|(source, count)| Ok((Source::from_str(&source)?, count)))
            .collect()
    }

    async fn count_by_author(&self) -> anyhow::Result<Vec<(Uuid, i64)>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT author_id, COUNT(*) FROM insights
            GROUP BY author_id
            ORDER BY author_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn count_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM insights WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }
}
