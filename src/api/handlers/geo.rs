// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, Query};
use serde::Deserialize;

use crate::api::routes::{ok, ApiResult, AppError};
use crate::geo;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    #[serde(default)]
    pub q: String,
    pub country: Option<String>,
}

pub async fn list_countries() -> ApiResult<Vec<&'static str>> {
    ok(geo::supported_countries())
}

pub async fn country_cities(Path(country): Path<String>) -> ApiResult<&'static [&'static str]> {
    ok(geo::cities_for(&country))
}

/// Cities matching `q`, optionally within one country
pub async fn search_cities(Query(query): Query<CityQuery>) -> ApiResult<Vec<&'static str>> {
    let country = query.country.as_deref().filter(|c| !c.trim().is_empty());
    ok(geo::search_cities(&query.q, country))
}

pub async fn city_country(Path(city): Path<String>) -> ApiResult<&'static str> {
    match geo::country_for_city(&city) {
        Some(country) => ok(country),
        None => Err(AppError::NotFound(format!("unknown city: {}", city))),
    }
}
