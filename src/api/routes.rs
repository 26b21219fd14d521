// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::form::{AccountType, Editor, FieldErrors, FormError, Identity, SAVE_FAILED};
use crate::plans::PlanError;
use crate::store::StoreError;
use crate::viewer::{ViewError, Viewer};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Errors a handler can answer with
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Validation(FieldErrors),
    /// Logged in full, answered with `public` only
    Internal { public: String, detail: String },
}

impl AppError {
    fn internal(public: &str, detail: impl std::fmt::Display) -> Self {
        AppError::Internal {
            public: public.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error(message))).into_response()
            }
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(ApiResponse::<()>::error(message))).into_response()
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::<()>::error(message))).into_response()
            }
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "success": false,
                    "data": null,
                    "error": "validation failed",
                    "fields": fields,
                })),
            )
                .into_response(),
            AppError::Internal { public, detail } => {
                error!("Request failed: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::<()>::error(public))).into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => {
                AppError::NotFound(format!("{} {} not found", collection, id))
            }
            other => AppError::internal("storage error", other),
        }
    }
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::Validation(fields) => AppError::Validation(fields),
            FormError::NotFound(id) => AppError::NotFound(format!("player {} not found", id)),
            FormError::Save(source) => AppError::internal(SAVE_FAILED, source),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::NotFound(_) | PlanError::FeatureNotFound { .. } => AppError::NotFound(e.to_string()),
            PlanError::Malformed { .. } => AppError::internal("malformed plan", e),
            PlanError::Store(inner) => inner.into(),
        }
    }
}

impl From<ViewError> for AppError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::NotFound(id) => AppError::NotFound(format!("player {} not found", id)),
            ViewError::Store(inner) => inner.into(),
        }
    }
}

/// 1-based page selection
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
}

impl PageParams {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The caller as announced by the gateway in `x-user-id` and `x-account-type`
pub fn editor_from(headers: &HeaderMap) -> Result<Editor, AppError> {
    let uid = header(headers, "x-user-id")
        .ok_or_else(|| AppError::Unauthorized("missing x-user-id header".to_string()))?;
    let account_type = match header(headers, "x-account-type") {
        Some(raw) => raw.parse::<AccountType>().map_err(AppError::BadRequest)?,
        None => AccountType::Player,
    };
    Ok(Editor {
        uid: uid.to_string(),
        account_type,
    })
}

pub fn identity_from(headers: &HeaderMap) -> Identity {
    let get = |name: &str| header(headers, name).map(str::to_string);
    Identity {
        display_name: get("x-user-name"),
        email: get("x-user-email"),
        phone: get("x-user-phone"),
        country: get("x-user-country"),
    }
}

/// Read from `x-viewer-id` (else `x-user-id`) and `x-viewer-org`.
/// Anonymous when neither is present.
pub fn viewer_from(headers: &HeaderMap) -> Viewer {
    Viewer {
        id: header(headers, "x-viewer-id")
            .or_else(|| header(headers, "x-user-id"))
            .map(str::to_string),
        organization_id: header(headers, "x-viewer-org").map(str::to_string),
    }
}
