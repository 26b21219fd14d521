// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::age::years_between;
use crate::models::player::StoredDate;
use crate::models::PlayerProfile;

pub const MIN_AGE: i32 = 3;
pub const MAX_AGE: i32 = 50;

const FULL_NAME_REQUIRED: &str = "الاسم الكامل مطلوب";
const BIRTH_DATE_REQUIRED: &str = "تاريخ الميلاد مطلوب";
const TOO_YOUNG: &str = "يجب أن يكون العمر 3 سنوات على الأقل";
const TOO_OLD: &str = "يجب أن يكون العمر أقل من 50 سنة";
const NATIONALITY_REQUIRED: &str = "الجنسية مطلوبة";
const COUNTRY_REQUIRED: &str = "الدولة مطلوبة";
const CITY_REQUIRED: &str = "المدينة مطلوبة";
const PHONE_REQUIRED: &str = "رقم الهاتف مطلوب";
const EMAIL_REQUIRED: &str = "البريد الإلكتروني مطلوب";
const PRIMARY_POSITION_REQUIRED: &str = "المركز الأساسي مطلوب";
const PREFERRED_FOOT_REQUIRED: &str = "القدم المفضلة مطلوبة";

/// Field name to localized message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn require(errors: &mut FieldErrors, value: &Option<String>, field: &str, message: &str) {
    if blank(value) {
        errors.insert(field, message);
    }
}

fn check_birth_date(errors: &mut FieldErrors, birth_date: Option<&StoredDate>, today: NaiveDate) {
    let birth = match birth_date {
        None => None,
        Some(StoredDate::Text(text)) if text.trim().is_empty() => None,
        Some(stored) => Some(crate::age::parse_birth_date(stored)),
    };

    match birth {
        None | Some(None) => errors.insert("birth_date", BIRTH_DATE_REQUIRED),
        Some(Some(date)) => {
            let age = years_between(date, today);
            if age < MIN_AGE {
                errors.insert("birth_date", TOO_YOUNG);
            } else if age > MAX_AGE {
                errors.insert("birth_date", TOO_OLD);
            }
        }
    }
}

/// Personal details: name, a birth date giving an age in [3, 50], and the
/// contact fields.
pub fn validate_personal(profile: &PlayerProfile, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, &profile.full_name, "full_name", FULL_NAME_REQUIRED);
    check_birth_date(&mut errors, profile.birth_date.as_ref(), today);
    require(&mut errors, &profile.nationality, "nationality", NATIONALITY_REQUIRED);
    require(&mut errors, &profile.country, "country", COUNTRY_REQUIRED);
    require(&mut errors, &profile.city, "city", CITY_REQUIRED);
    require(&mut errors, &profile.phone, "phone", PHONE_REQUIRED);
    require(&mut errors, &profile.email, "email", EMAIL_REQUIRED);
    errors
}

pub fn validate_sports(profile: &PlayerProfile) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if profile.primary_position.is_none() {
        errors.insert("primary_position", PRIMARY_POSITION_REQUIRED);
    }
    if profile.preferred_foot.is_none() {
        errors.insert("preferred_foot", PREFERRED_FOOT_REQUIRED);
    }
    errors
}
