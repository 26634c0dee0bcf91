use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::ApiError,
    insights::dto::{
        AnalyticsResponse, CreateInsightRequest, InsightListResponse, InsightResponse,
        Pagination, UpdateInsightRequest,
    },
    insights::services::{self, InsightPatch, NewInsight},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/insights", get(list_insights).post(create_insight))
        .route("/insights/analytics", get(get_analytics))
        .route(
            "/insights/:id",
            get(get_insight).put(update_insight).delete(delete_insight),
        )
}

#[instrument(skip_all)]
pub async fn list_insights(
    State(state): State<AppState>,
    CurrentUser(_principal): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<InsightListResponse>, ApiError> {
    let (items, total) = services::list(state.insights.as_ref(), p.limit, p.offset).await?;
    Ok(Json(InsightListResponse {
        items: items.into_iter().map(Into::into).collect(),
        total,
        limit: p.limit,
        offset: p.offset,
    }))
}

#[instrument(skip_all)]
pub async fn create_insight(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<CreateInsightRequest>,
) -> Result<(StatusCode, Json<InsightResponse>), ApiError> {
    let insight = services::create(
        state.insights.as_ref(),
        &principal,
        NewInsight {
            title: payload.title,
            description: payload.description,
            source: payload.source,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(insight.into())))
}

#[instrument(skip_all, fields(insight_id = %id))]
pub async fn get_insight(
    State(state): State<AppState>,
    CurrentUser(_principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InsightResponse>, ApiError> {
    let insight = services::get(state.insights.as_ref(), id).await?;
    Ok(Json(insight.into()))
}

#[instrument(skip_all, fields(insight_id = %id))]
pub async fn update_insight(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInsightRequest>,
) -> Result<Json<InsightResponse>, ApiError> {
    let insight = services::update(
        state.insights.as_ref(),
        &principal,
        id,
        InsightPatch {
            title: payload.title,
            description: payload.description,
            source: payload.source,
        },
    )
    .await?;
    Ok(Json(insight.into()))
}

#[instrument(skip_all, fields(insight_id = %id))]
pub async fn delete_insight(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete(state.insights.as_ref(), &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn get_analytics(
    State(state): State<AppState>,
    CurrentUser(_principal): CurrentUser,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let summary = services::analytics(state.insights.as_ref()).await?;
    Ok(Json(summary.into()))
}
