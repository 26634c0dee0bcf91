use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::insights::repo_types::{Insight, Source};
use crate::insights::services::Analytics;

#[derive(Debug, Deserialize)]
pub struct CreateInsightRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub source: Option<Source>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInsightRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<Source>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub source: Option<Source>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Insight> for InsightResponse {
    fn from(i: Insight) -> Self {
        Self {
            id: i.id,
            title: i.title,
            description: i.description,
            source: i.source,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InsightListResponse {
    pub items: Vec<InsightResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct WeeklyCount {
    #[serde(with = "time::serde::rfc3339")]
    pub week_start: OffsetDateTime,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_count: i64,
    pub count_by_source: BTreeMap<&'static str, i64>,
    pub count_by_author: BTreeMap<Uuid, i64>,
    pub insights_per_week: Vec<WeeklyCount>,
}

impl From<Analytics> for AnalyticsResponse {
    fn from(a: Analytics) -> Self {
        Self {
            total_count: a.total_count,
            count_by_source: a
                .count_by_source
                .into_iter()
                .map(|(source, count)| (source.as_str(), count))
                .collect(),
            count_by_author: a.count_by_author.into_iter().collect(),
            insights_per_week: a
                .insights_per_week
                .into_iter()
                .map(|(week_start, count)| WeeklyCount { week_start, count })
                .collect(),
        }
    }
}
