// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::routes::{ok, ApiResponse, ApiResult, AppError};
use crate::api::AppState;
use crate::models::{PlanFeature, SubscriptionPlan};
use crate::plans::{plan_template, FeatureUpdate};

#[derive(Debug, Default, Deserialize)]
pub struct DuplicateRequest {
    /// Days for the copy; absent or zero rotates the source duration
    pub duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Vec<SubscriptionPlan>> {
    ok(state.plans.list().await?)
}

/// Defaults for the "new plan" editor
pub async fn get_template() -> ApiResult<SubscriptionPlan> {
    ok(plan_template())
}

pub async fn get_plan(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SubscriptionPlan> {
    ok(state.plans.get(&id).await?)
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(plan): Json<SubscriptionPlan>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionPlan>>), AppError> {
    let plan = state.plans.create(plan).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(plan))))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(plan): Json<SubscriptionPlan>,
) -> ApiResult<SubscriptionPlan> {
    ok(state.plans.update(&id, plan).await?)
}

pub async fn delete_plan(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<String> {
    state.plans.delete(&id).await?;
    ok(id)
}

pub async fn duplicate_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<DuplicateRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionPlan>>), AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let copy = state.plans.duplicate(&id, request.duration).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(copy))))
}

pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ActiveRequest>,
) -> ApiResult<SubscriptionPlan> {
    ok(state.plans.set_active(&id, request.active).await?)
}

pub async fn add_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(feature): Json<PlanFeature>,
) -> ApiResult<SubscriptionPlan> {
    ok(state.plans.add_feature(&id, feature).await?)
}

pub async fn update_feature(
    State(state): State<AppState>,
    Path((id, feature_id)): Path<(String, String)>,
    Json(update): Json<FeatureUpdate>,
) -> ApiResult<SubscriptionPlan> {
    ok(state.plans.update_feature(&id, &feature_id, update).await?)
}

pub async fn remove_feature(
    State(state): State<AppState>,
    Path((id, feature_id)): Path<(String, String)>,
) -> ApiResult<SubscriptionPlan> {
    ok(state.plans.remove_feature(&id, &feature_id).await?)
}
