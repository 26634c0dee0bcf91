use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractors::Principal;
use crate::error::ApiError;
use crate::insights::policy;
use crate::insights::repo_types::{Insight, Source};
use crate::store::InsightStore;

pub const MAX_TITLE_CHARS: usize = 200;
const RESOURCE: &str = "Insight";
const ANALYTICS_WEEKS: i64 = 8;

pub struct NewInsight {
    pub title: String,
    pub description: String,
    pub source: Option<Source>,
}

/// Fields present are applied; fields absent are left untouched.
#[derive(Default)]
pub struct InsightPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<Source>,
}

pub struct Analytics {
    pub total_count: i64,
    pub count_by_source: Vec<(Source, i64)>,
    pub count_by_author: Vec<(Uuid, i64)>,
    /// Trailing rolling weeks, oldest first; each entry is the window start.
    pub insights_per_week: Vec<(OffsetDateTime, i64)>,
}

// Request validation runs upstream too, but this layer is the authoritative
// boundary.
fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::Validation(
            "Title must be 200 characters or less".into(),
        ));
    }
    Ok(())
}

pub async fn list(
    store: &dyn InsightStore,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Insight>, i64), ApiError> {
    if limit <= 0 {
        return Err(ApiError::Validation("limit must be positive".into()));
    }
    if offset < 0 {
        return Err(ApiError::Validation("offset must not be negative".into()));
    }
    // Offsets snap to whole pages: page = offset / limit.
    let offset = (offset / limit) * limit;
    Ok(store.list_recent(limit, offset).await?)
}

pub async fn get(store: &dyn InsightStore, id: Uuid) -> Result<Insight, ApiError> {
    store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))
}

pub async fn create(
    store: &dyn InsightStore,
    principal: &Principal,
    new: NewInsight,
) -> Result<Insight, ApiError> {
    validate_title(&new.title)?;
    if new.description.trim().is_empty() {
        return Err(ApiError::Validation("Description cannot be empty".into()));
    }

    let insight = Insight::new(principal.id, new.title, new.description, new.source);
    store.insert(&insight).await?;
    info!(insight_id = %insight.id, user_id = %principal.id, "insight created");
    Ok(insight)
}

/// Existence is checked before ownership: a non-owner probing a missing id
/// sees NotFound, never Forbidden.
pub async fn update(
    store: &dyn InsightStore,
    principal: &Principal,
    id: Uuid,
    patch: InsightPatch,
) -> Result<Insight, ApiError> {
    let mut insight = store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))?;

    if !policy::can_modify(principal, insight.author_id) {
        return Err(ApiError::Forbidden);
    }

    if let Some(title) = patch.title {
        validate_title(&title)?;
        insight.title = title;
    }
    if let Some(description) = patch.description {
        insight.description = description;
    }
    if let Some(source) = patch.source {
        insight.source = Some(source);
    }
    insight.updated_at = OffsetDateTime::now_utc();

    // The row may be gone by write time if a concurrent delete won the
    // race; the store reports that as no row matched.
    let updated = store
        .update(&insight)
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))?;
    info!(insight_id = %id, user_id = %principal.id, "insight updated");
    Ok(updated)
}

pub async fn delete(
    store: &dyn InsightStore,
    principal: &Principal,
    id: Uuid,
) -> Result<(), ApiError> {
    let insight = store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))?;

    if !policy::can_modify(principal, insight.author_id) {
        return Err(ApiError::Forbidden);
    }

    if !store.delete(id).await? {
        return Err(ApiError::NotFound(RESOURCE));
    }
    info!(insight_id = %id, user_id = %principal.id, "insight deleted");
    Ok(())
}

/// Rolling activity summary over the trailing eight weeks.
pub async fn analytics(store: &dyn InsightStore) -> Result<Analytics, ApiError> {
    let total_count = store.count().await?;
    let count_by_source = store.count_by_source().await?;
    let count_by_author = store.count_by_author().await?;

    let now = OffsetDateTime::now_utc();
    let mut insights_per_week = Vec::with_capacity(ANALYTICS_WEEKS as usize);
    for k in (0..ANALYTICS_WEEKS).rev() {
        let start = now - TimeDuration::weeks(k + 1);
        let end = now - TimeDuration::weeks(k);
        let count = store.count_created_between(start, end).await?;
        insights_per_week.push((start, count));
    }

    Ok(Analytics {
        total_count,
        count_by_source,
        count_by_author,
        insights_per_week,
    })
}
