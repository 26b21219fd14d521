// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::store::Fields;

labelled_enum! {
    Currency {
        Usd => "USD",
        Egp => "EGP",
        Sar => "SAR",
        Aed => "AED",
        Qar => "QAR",
        Kwd => "KWD",
        Bhd => "BHD",
        Omr => "OMR",
        Jod => "JOD",
        Eur => "EUR",
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

labelled_enum! {
    SupportLevel {
        Basic => "basic",
        Premium => "premium",
        Priority => "priority",
    }
}

impl Default for SupportLevel {
    fn default() -> Self {
        SupportLevel::Basic
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFeature {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

/// A subscription plan as stored in `subscription_plans`.
///
/// Reading is lenient: a missing `isActive` means active, a missing
/// `isFeatured` means not featured and a `features` value that is not a list
/// reads as no features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "price")]
    pub price: BigDecimal,
    #[serde(default, deserialize_with = "lenient_currency")]
    pub currency: Currency,
    #[serde(default)]
    pub duration: i64,
    #[serde(default, deserialize_with = "super::lenient_list")]
    pub features: Vec<PlanFeature>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_storage: Option<i64>,
    #[serde(default, deserialize_with = "lenient_support_level")]
    pub support_level: SupportLevel,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubscriptionPlan {
    /// Read a plan from stored document fields. The document id wins over any
    /// `id` stored inside the body.
    pub fn from_fields(id: impl Into<String>, fields: Fields) -> Result<Self, serde_json::Error> {
        let mut plan: SubscriptionPlan = serde_json::from_value(serde_json::Value::Object(fields))?;
        plan.id = Some(id.into());
        Ok(plan)
    }
}

fn lenient_currency<'de, D>(deserializer: D) -> Result<Currency, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn lenient_support_level<'de, D>(deserializer: D) -> Result<SupportLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Prices are stored as JSON numbers and handled as decimals in memory
mod price {
    use bigdecimal::{BigDecimal, ToPrimitive};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(price: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        match price.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&price.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => BigDecimal::from_str(&n.to_string()).map_err(D::Error::custom),
            Value::String(s) if !s.trim().is_empty() => {
                BigDecimal::from_str(s.trim()).map_err(D::Error::custom)
            }
            _ => Ok(BigDecimal::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn missing_flags_take_defaults() {
        let plan = SubscriptionPlan::from_fields(
            "plan1",
            fields(json!({ "name": "أساسي", "price": 19.99, "duration": 30, "features": "oops" })),
        )
        .unwrap();

        assert_eq!(plan.id.as_deref(), Some("plan1"));
        assert!(plan.is_active);
        assert!(!plan.is_featured);
        assert!(plan.features.is_empty());
        assert_eq!(plan.price, BigDecimal::from_str("19.99").unwrap());
        assert_eq!(plan.currency, Currency::Usd);
    }

    #[test]
    fn serializes_with_camel_case_keys_and_numeric_price() {
        let plan = SubscriptionPlan {
            name_en: "Gold".into(),
            price: BigDecimal::from_str("250").unwrap(),
            currency: Currency::Sar,
            is_featured: true,
            ..Default::default()
        };

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["nameEn"], "Gold");
        assert_eq!(value["price"], 250.0);
        assert_eq!(value["currency"], "SAR");
        assert_eq!(value["isFeatured"], true);
        assert_eq!(value["supportLevel"], "basic");
        assert!(value.get("id").is_none());
    }
}
