// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{http::header, response::IntoResponse};

/// Prometheus text exposition of the service counters
pub async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(),
    )
}
