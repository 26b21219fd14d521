// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::api::routes::{editor_from, identity_from, ok, viewer_from, ApiResponse, ApiResult, AppError, PageParams};
use crate::api::AppState;
use crate::directory::canonical::{canonicalize_player, CanonicalReport};
use crate::directory::{DirectoryFilter, DirectoryPage};
use crate::form::{Editor, FormError, Identity, PlayerForm, SaveOutcome, Step};
use crate::models::PlayerProfile;
use crate::store::Fields;
use crate::viewer::{view_player, PlayerView};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Players edit their own profile; anyone else edits an existing one
async fn open_form(
    state: &AppState,
    editor: Editor,
    identity: &Identity,
    player_id: &str,
) -> Result<PlayerForm, FormError> {
    if editor.uid == player_id {
        PlayerForm::open_own(state.store.clone(), state.notifier.clone(), editor, identity).await
    } else {
        PlayerForm::open_existing(state.store.clone(), state.notifier.clone(), editor, player_id).await
    }
}

/// Filtered, paginated player directory
pub async fn search_players(
    State(state): State<AppState>,
    Query(filter): Query<DirectoryFilter>,
    Query(params): Query<PageParams>,
) -> ApiResult<DirectoryPage> {
    let page = state.directory.search(&filter, params.page()).await?;
    ok(page)
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<PlayerView> {
    let viewer = viewer_from(&headers);
    let view = view_player(state.store.as_ref(), state.storage.as_ref(), &id, &viewer, today()).await?;
    ok(view)
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub player_id: Option<String>,
    pub step: Step,
    pub profile: PlayerProfile,
}

/// Apply one step's edits and move forward
pub async fn submit_step(
    State(state): State<AppState>,
    Path((id, step)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<Fields>,
) -> ApiResult<StepResponse> {
    let step = step.parse::<Step>().map_err(AppError::BadRequest)?;
    let editor = editor_from(&headers)?;
    let mut form = open_form(&state, editor, &identity_from(&headers), &id).await?;

    form.jump_to(step);
    form.apply(patch);
    let step = form.next(today()).await?;
    debug!(player_id = %id, %step, "Player form advanced");

    ok(StepResponse {
        player_id: form.player_id().map(str::to_string),
        step,
        profile: form.draft().clone(),
    })
}

/// Apply edits and save the whole profile
pub async fn save_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<Fields>,
) -> ApiResult<SaveOutcome> {
    let editor = editor_from(&headers)?;
    let mut form = open_form(&state, editor, &identity_from(&headers), &id).await?;
    form.apply(patch);
    ok(form.save(today()).await?)
}

/// An organization registers a new player affiliated with itself
pub async fn create_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<Fields>,
) -> Result<(StatusCode, Json<ApiResponse<SaveOutcome>>), AppError> {
    let editor = editor_from(&headers)?;
    if editor.account_type.organization_kind().is_none() {
        return Err(AppError::BadRequest(format!(
            "{} accounts cannot create players",
            editor.account_type.as_str()
        )));
    }

    let identity = identity_from(&headers);
    let mut form =
        PlayerForm::new_for_organization(state.store.clone(), state.notifier.clone(), editor, &identity).await?;
    form.apply(patch);
    let outcome = form.save(today()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}

/// Rewrite a player document's legacy keys
pub async fn canonicalize(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CanonicalReport> {
    ok(canonicalize_player(state.store.as_ref(), &id).await?)
}
