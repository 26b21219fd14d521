// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use bigdecimal::BigDecimal;
use std::sync::Arc;
use tokio_test::assert_ok;

use recruit_hub::models::{PlanFeature, SubscriptionPlan};
use recruit_hub::plans::{FeatureUpdate, PlanAdmin, PlanError};
use recruit_hub::store::MemoryStore;

fn gold() -> SubscriptionPlan {
    SubscriptionPlan {
        name: "الذهبية".to_string(),
        name_en: "Gold".to_string(),
        price: BigDecimal::from(120),
        duration: 30,
        is_active: true,
        ..SubscriptionPlan::default()
    }
}

#[test_log::test(tokio::test)]
async fn duplicating_a_monthly_plan_makes_an_inactive_quarterly_copy() {
    let admin = PlanAdmin::new(Arc::new(MemoryStore::new()));
    let source = admin.create(gold()).await.unwrap();
    let source_id = source.id.clone().unwrap();

    let copy = admin.duplicate(&source_id, None).await.unwrap();

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.duration, 90);
    assert_eq!(copy.name, "الذهبية (3 أشهر)");
    assert!(!copy.is_active);

    let plans = admin.list().await.unwrap();
    assert_eq!(plans.len(), 2);
    assert!(admin.get(&source_id).await.unwrap().is_active);
}

#[test_log::test(tokio::test)]
async fn explicit_duration_wins_over_rotation() {
    let admin = PlanAdmin::new(Arc::new(MemoryStore::new()));
    let source = admin.create(gold()).await.unwrap();

    let copy = admin.duplicate(source.id.as_deref().unwrap(), Some(365)).await.unwrap();
    assert_eq!(copy.duration, 365);
    assert_eq!(copy.name, "الذهبية (سنة)");
}

#[test_log::test(tokio::test)]
async fn features_are_edited_in_place() {
    let admin = PlanAdmin::new(Arc::new(MemoryStore::new()));
    let plan = admin.create(gold()).await.unwrap();
    let id = plan.id.unwrap();

    let plan = admin
        .add_feature(
            &id,
            PlanFeature {
                name: "رفع الفيديو".to_string(),
                included: true,
                ..PlanFeature::default()
            },
        )
        .await
        .unwrap();
    let feature_id = plan.features[0].id.clone();
    assert!(!feature_id.is_empty());

    let plan = admin
        .update_feature(
            &id,
            &feature_id,
            FeatureUpdate {
                limit: Some(5),
                ..FeatureUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(plan.features[0].limit, Some(5));
    assert!(plan.features[0].included);

    let plan = admin.remove_feature(&id, &feature_id).await.unwrap();
    assert!(plan.features.is_empty());
    assert!(matches!(
        admin.remove_feature(&id, &feature_id).await,
        Err(PlanError::FeatureNotFound { .. })
    ));
}

#[test_log::test(tokio::test)]
async fn deactivated_plans_stay_listed() {
    let admin = PlanAdmin::new(Arc::new(MemoryStore::new()));
    let plan = admin.create(gold()).await.unwrap();
    let id = plan.id.unwrap();

    let plan = admin.set_active(&id, false).await.unwrap();
    assert!(!plan.is_active);
    assert_eq!(admin.list().await.unwrap().len(), 1);

    assert_ok!(admin.delete(&id).await);
    assert!(matches!(admin.get(&id).await, Err(PlanError::NotFound(_))));
}
