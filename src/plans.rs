// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Subscription plan administration.

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::metrics::{outcome, PLAN_WRITES};
use crate::models::{PlanFeature, SubscriptionPlan};
use crate::store::{collections, to_fields, DocumentStore, PageRequest, StoreError};

const LIST_PAGE_SIZE: usize = 500;

/// Optional limits a plan update may clear
const CLEARABLE_FIELDS: [&str; 2] = ["maxUsers", "maxStorage"];

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan {0} not found")]
    NotFound(String),
    #[error("feature {feature} not found on plan {plan}")]
    FeatureNotFound { plan: String, feature: String },
    #[error("malformed plan {id}: {reason}")]
    Malformed { id: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Duration a duplicate gets when no target is given
pub fn next_duration(duration: i64) -> i64 {
    match duration {
        30 => 90,
        90 => 180,
        180 => 365,
        365 => 30,
        _ => 30,
    }
}

/// Localized suffix naming a duration in days
pub fn duration_suffix(duration: i64) -> String {
    match duration {
        30 => " (شهر)".to_string(),
        90 => " (3 أشهر)".to_string(),
        180 => " (6 أشهر)".to_string(),
        365 => " (سنة)".to_string(),
        days => format!(" ({} يوم)", days),
    }
}

/// Copy of `plan` for a new duration. The copy has no id or timestamps and
/// starts inactive. A missing or zero target rotates the duration.
pub fn duplicate_of(plan: &SubscriptionPlan, target_duration: Option<i64>) -> SubscriptionPlan {
    let duration = target_duration
        .filter(|days| *days != 0)
        .unwrap_or_else(|| next_duration(plan.duration));

    SubscriptionPlan {
        id: None,
        name: format!("{}{}", plan.name, duration_suffix(duration)),
        name_en: format!("{} ({}D)", plan.name_en, duration),
        duration,
        is_active: false,
        created_at: None,
        updated_at: None,
        ..plan.clone()
    }
}

/// Partial update of a plan feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureUpdate {
    pub name: Option<String>,
    pub included: Option<bool>,
    pub limit: Option<i64>,
    pub description: Option<String>,
}

impl FeatureUpdate {
    fn apply(self, feature: &mut PlanFeature) {
        if let Some(name) = self.name {
            feature.name = name;
        }
        if let Some(included) = self.included {
            feature.included = included;
        }
        if self.limit.is_some() {
            feature.limit = self.limit;
        }
        if self.description.is_some() {
            feature.description = self.description;
        }
    }
}

/// Starting point for a new plan in the admin editor
pub fn plan_template() -> SubscriptionPlan {
    let feature = |name: &str, description: &str| PlanFeature {
        id: new_feature_id(),
        name: name.to_string(),
        included: true,
        limit: None,
        description: Some(description.to_string()),
    };

    SubscriptionPlan {
        description: "باقة اشتراك مميزة مع مجموعة من الخدمات".to_string(),
        price: BigDecimal::from(50),
        duration: 30,
        features: vec![
            feature("إنشاء ملف شخصي احترافي", "ملف شخصي كامل مع جميع البيانات"),
            feature("دعم فني مميز", "دعم فني سريع ومتخصص"),
        ],
        is_active: true,
        color: "blue".to_string(),
        icon: "Package".to_string(),
        max_users: Some(1),
        max_storage: Some(100),
        ..SubscriptionPlan::default()
    }
}

fn new_feature_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub struct PlanAdmin {
    store: Arc<dyn DocumentStore>,
}

impl PlanAdmin {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All plans, cheapest first. Documents that cannot be read are skipped.
    pub async fn list(&self) -> Result<Vec<SubscriptionPlan>, PlanError> {
        let mut plans = Vec::new();
        let mut page = PageRequest::first(LIST_PAGE_SIZE);

        loop {
            let batch = self.store.list(collections::SUBSCRIPTION_PLANS, page).await?;
            let full = batch.len() == LIST_PAGE_SIZE;
            let last_id = batch.last().map(|doc| doc.id.clone());

            for doc in batch {
                match SubscriptionPlan::from_fields(doc.id.clone(), doc.data) {
                    Ok(plan) => plans.push(plan),
                    Err(e) => warn!(id = %doc.id, "Skipping unreadable plan: {}", e),
                }
            }

            match last_id {
                Some(id) if full => page = PageRequest::after(LIST_PAGE_SIZE, id),
                _ => break,
            }
        }

        plans.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(plans)
    }

    pub async fn get(&self, id: &str) -> Result<SubscriptionPlan, PlanError> {
        let doc = self
            .store
            .get(collections::SUBSCRIPTION_PLANS, id)
            .await?
            .ok_or_else(|| PlanError::NotFound(id.to_string()))?;

        SubscriptionPlan::from_fields(doc.id, doc.data).map_err(|e| PlanError::Malformed {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Store a new plan under a fresh id
    pub async fn create(&self, plan: SubscriptionPlan) -> Result<SubscriptionPlan, PlanError> {
        let now = Utc::now();
        let plan = SubscriptionPlan {
            id: None,
            created_at: Some(now),
            updated_at: Some(now),
            ..plan
        };

        let result = self
            .store
            .create(collections::SUBSCRIPTION_PLANS, to_fields(&plan)?)
            .await;
        PLAN_WRITES.with_label_values(&["create", outcome(&result)]).inc();
        let id = result.map_err(|e| {
            error!("Failed to create plan {}: {}", plan.name, e);
            e
        })?;

        info!(%id, name = %plan.name, duration = plan.duration, "Created subscription plan");
        Ok(SubscriptionPlan {
            id: Some(id),
            ..plan
        })
    }

    /// Overwrite the editable fields of an existing plan
    pub async fn update(&self, id: &str, plan: SubscriptionPlan) -> Result<SubscriptionPlan, PlanError> {
        let existing = self.get(id).await?;
        let plan = SubscriptionPlan {
            id: None,
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
            ..plan
        };

        self.write(id, &plan, "update").await?;
        info!(%id, "Updated subscription plan");
        Ok(SubscriptionPlan {
            id: Some(id.to_string()),
            ..plan
        })
    }

    pub async fn delete(&self, id: &str) -> Result<(), PlanError> {
        let result = self.store.delete(collections::SUBSCRIPTION_PLANS, id).await;
        PLAN_WRITES.with_label_values(&["delete", outcome(&result)]).inc();
        result.map_err(|e| {
            error!("Failed to delete plan {}: {}", id, e);
            e
        })?;
        info!(%id, "Deleted subscription plan");
        Ok(())
    }

    /// Store an inactive copy of a plan for another duration
    pub async fn duplicate(&self, id: &str, target_duration: Option<i64>) -> Result<SubscriptionPlan, PlanError> {
        let source = self.get(id).await?;
        let copy = duplicate_of(&source, target_duration);
        info!(source = %id, duration = copy.duration, "Duplicating subscription plan");
        self.create(copy).await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<SubscriptionPlan, PlanError> {
        let mut plan = self.get(id).await?;
        plan.is_active = active;
        self.update(id, plan).await
    }

    /// Append a feature. A blank id is replaced by a generated one.
    pub async fn add_feature(&self, id: &str, mut feature: PlanFeature) -> Result<SubscriptionPlan, PlanError> {
        let mut plan = self.get(id).await?;
        if feature.id.trim().is_empty() {
            feature.id = new_feature_id();
        }
        plan.features.push(feature);
        self.update(id, plan).await
    }

    pub async fn update_feature(
        &self,
        id: &str,
        feature_id: &str,
        update: FeatureUpdate,
    ) -> Result<SubscriptionPlan, PlanError> {
        let mut plan = self.get(id).await?;
        let feature = plan
            .features
            .iter_mut()
            .find(|f| f.id == feature_id)
            .ok_or_else(|| PlanError::FeatureNotFound {
                plan: id.to_string(),
                feature: feature_id.to_string(),
            })?;
        update.apply(feature);
        self.update(id, plan).await
    }

    pub async fn remove_feature(&self, id: &str, feature_id: &str) -> Result<SubscriptionPlan, PlanError> {
        let mut plan = self.get(id).await?;
        let before = plan.features.len();
        plan.features.retain(|f| f.id != feature_id);
        if plan.features.len() == before {
            return Err(PlanError::FeatureNotFound {
                plan: id.to_string(),
                feature: feature_id.to_string(),
            });
        }
        self.update(id, plan).await
    }

    /// Write a whole plan body. Unset limits go out as null so the merge
    /// clears them.
    async fn write(&self, id: &str, plan: &SubscriptionPlan, operation: &str) -> Result<(), PlanError> {
        let mut fields = to_fields(plan)?;
        for key in CLEARABLE_FIELDS {
            fields.entry(key.to_string()).or_insert(Value::Null);
        }
        let result = self
            .store
            .update(collections::SUBSCRIPTION_PLANS, id, fields)
            .await;
        PLAN_WRITES.with_label_values(&[operation, outcome(&result)]).inc();
        result.map_err(|e| {
            error!("Failed to {} plan {}: {}", operation, id, e);
            match e {
                StoreError::NotFound { .. } => PlanError::NotFound(id.to_string()),
                other => PlanError::Store(other),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;
    use crate::store::MemoryStore;
    use std::str::FromStr;

    fn admin() -> PlanAdmin {
        PlanAdmin::new(Arc::new(MemoryStore::new()))
    }

    fn plan(name: &str, price: &str, duration: i64) -> SubscriptionPlan {
        SubscriptionPlan {
            name: name.to_string(),
            name_en: name.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            currency: Currency::Sar,
            duration,
            ..SubscriptionPlan::default()
        }
    }

    #[test]
    fn durations_rotate() {
        assert_eq!(next_duration(30), 90);
        assert_eq!(next_duration(90), 180);
        assert_eq!(next_duration(180), 365);
        assert_eq!(next_duration(365), 30);
        assert_eq!(next_duration(45), 30);
        assert_eq!(next_duration(0), 30);
    }

    #[test]
    fn duplicate_names_the_new_duration() {
        let source = SubscriptionPlan {
            id: Some("p1".into()),
            is_active: true,
            created_at: Some(Utc::now()),
            ..plan("ذهبية", "100", 365)
        };

        let rotated = duplicate_of(&source, None);
        assert_eq!(rotated.duration, 30);
        assert_eq!(rotated.name, "ذهبية (شهر)");
        assert_eq!(rotated.name_en, "ذهبية (30D)");
        assert!(!rotated.is_active);
        assert!(rotated.id.is_none());
        assert!(rotated.created_at.is_none());

        let custom = duplicate_of(&source, Some(45));
        assert_eq!(custom.duration, 45);
        assert_eq!(custom.name, "ذهبية (45 يوم)");

        let zero = duplicate_of(&source, Some(0));
        assert_eq!(zero.duration, 30);
    }

    #[test]
    fn template_starts_active_with_two_features() {
        let template = plan_template();
        assert!(template.is_active);
        assert_eq!(template.features.len(), 2);
        assert_ne!(template.features[0].id, template.features[1].id);
    }

    #[tokio::test]
    async fn list_orders_by_price() {
        let admin = admin();
        admin.create(plan("b", "99.5", 30)).await.unwrap();
        admin.create(plan("a", "10", 30)).await.unwrap();
        admin.create(plan("c", "250", 30)).await.unwrap();

        let names: Vec<_> = admin.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn feature_editing_round_trips() {
        let admin = admin();
        let created = admin.create(plan("basic", "20", 30)).await.unwrap();
        let id = created.id.unwrap();

        let with_feature = admin
            .add_feature(
                &id,
                PlanFeature {
                    name: "تحليل الأداء".into(),
                    included: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let feature_id = with_feature.features[0].id.clone();
        assert!(!feature_id.is_empty());

        let updated = admin
            .update_feature(
                &id,
                &feature_id,
                FeatureUpdate {
                    limit: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.features[0].limit, Some(5));
        assert_eq!(updated.features[0].name, "تحليل الأداء");

        let removed = admin.remove_feature(&id, &feature_id).await.unwrap();
        assert!(removed.features.is_empty());
        assert!(matches!(
            admin.remove_feature(&id, &feature_id).await,
            Err(PlanError::FeatureNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_clears_unset_limits() {
        let admin = admin();
        let created = admin
            .create(SubscriptionPlan {
                max_users: Some(5),
                max_storage: Some(10),
                ..plan("فضية", "50", 30)
            })
            .await
            .unwrap();
        let id = created.id.clone().unwrap();

        let returned = admin
            .update(&id, SubscriptionPlan { max_users: None, ..created })
            .await
            .unwrap();
        assert_eq!(returned.max_users, None);

        let stored = admin.get(&id).await.unwrap();
        assert_eq!(stored.max_users, None);
        assert_eq!(stored.max_storage, Some(10));
    }

    #[tokio::test]
    async fn updating_a_missing_plan_fails() {
        let admin = admin();
        assert!(matches!(
            admin.update("ghost", plan("x", "1", 30)).await,
            Err(PlanError::NotFound(_))
        ));
    }
}
