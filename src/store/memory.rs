use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InsightStore, UserStore};
use crate::auth::repo_types::User;
use crate::insights::repo_types::{Insight, Source};

/// In-memory user store backing unit tests and `AppState::fake()`.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        anyhow::ensure!(
            !users.iter().any(|u| u.email == user.email),
            "email already registered: {}",
            user.email
        );
        users.push(user.clone());
        Ok(())
    }
}

/// In-memory insight store with the same contract as the Postgres one.
#[derive(Default)]
pub struct MemoryInsightStore {
    insights: RwLock<HashMap<Uuid, Insight>>,
}

#[async_trait]
impl InsightStore for MemoryInsightStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Insight>> {
        Ok(self.insights.read().await.get(&id).cloned())
    }

    async fn insert(&self, insight: &Insight) -> anyhow::Result<()> {
        self.insights
            .write()
            .await
            .insert(insight.id, insight.clone());
        Ok(())
    }

    async fn update(&self, insight: &Insight) -> anyhow::Result<Option<Insight>> {
        let mut insights = self.insights.write().await;
        if !insights.contains_key(&insight.id) {
            return Ok(None);
        }
        insights.insert(insight.id, insight.clone());
        Ok(Some(insight.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.insights.write().await.remove(&id).is_some())
    }

    async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<Insight>, i64)> {
        let insights = self.insights.read().await;
        let total = insights.len() as i64;

        let mut items: Vec<Insight> = insights.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let items = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((items, total))
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.insights.read().await.len() as i64)
    }

    async fn count_by_source(&self) -> anyhow::Result<Vec<(Source, i64)>> {
        let insights = self.insights.read().await;
        let mut counts: HashMap<Source, i64> = HashMap::new();
        for insight in insights.values() {
            if let Some(source) = insight.source {
                *counts.entry(source).or_default() += 1;
            }
        }
        let mut counts: Vec<(Source, i64)> = counts.into_iter().collect();
        counts.sort_by_key(|(source, _)| source.as_str());
        Ok(counts)
    }

    async fn count_by_author(&self) -> anyhow::Result<Vec<(Uuid, i64)>> {
        let insights = self.insights.read().await;
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for insight in insights.values() {
            *counts.entry(insight.author_id).or_default() += 1;
        }
        let mut counts: Vec<(Uuid, i64)> = counts.into_iter().collect();
        counts.sort_by_key(|(author, _)| *author);
        Ok(counts)
    }

    async fn count_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<i64> {
        let insights = self.insights.read().await;
        Ok(insights
            .values()
            .filter(|i| i.created_at >= start && i.created_at < end)
            .count() as i64)
    }
}
