// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Birth date parsing and age arithmetic.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::models::player::StoredDate;

/// Age shown when a stored birth date cannot be trusted
pub const FALLBACK_AGE: u32 = 20;

/// Oldest age accepted before the fallback kicks in
const MAX_PLAUSIBLE_AGE: i32 = 100;

const TEXT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Calendar date of a stored birth date, if it can be read at all
pub fn parse_birth_date(date: &StoredDate) -> Option<NaiveDate> {
    match date {
        StoredDate::Text(text) => parse_text(text.trim()),
        StoredDate::Timestamp { seconds } => {
            DateTime::<Utc>::from_timestamp(*seconds, 0).map(|dt| dt.date_naive())
        }
        StoredDate::EpochMillis(millis) => {
            DateTime::<Utc>::from_timestamp_millis(*millis).map(|dt| dt.date_naive())
        }
    }
}

fn parse_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Whole years between `birth` and `today`. Negative when `birth` is in the future.
pub fn years_between(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Age shown on a profile.
///
/// A missing birth date shows no age. A date that cannot be read, lies in the
/// current year or later, or yields more than 100 years shows
/// [`FALLBACK_AGE`]. The result is never negative.
pub fn display_age(birth_date: Option<&StoredDate>, today: NaiveDate) -> Option<u32> {
    let stored = birth_date?;
    if matches!(stored, StoredDate::Text(text) if text.trim().is_empty()) {
        return None;
    }

    let Some(birth) = parse_birth_date(stored) else {
        return Some(FALLBACK_AGE);
    };
    if birth.year() >= today.year() {
        return Some(FALLBACK_AGE);
    }

    let age = years_between(birth, today);
    if age > MAX_PLAUSIBLE_AGE {
        return Some(FALLBACK_AGE);
    }
    Some(u32::try_from(age.max(0)).unwrap_or(0))
}
