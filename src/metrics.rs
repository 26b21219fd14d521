// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

fn counter_vec(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .unwrap_or_else(|e| panic!("invalid metric definition {}: {}", name, e));
    if let Err(e) = REGISTRY.register(Box::new(counter.clone())) {
        error!("Failed to register metric {}: {}", name, e);
    }
    counter
}

/// Player profile writes by operation (`create`, `step`, `save`, `canonicalize`) and outcome
pub static PLAYER_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "recruit_player_writes_total",
        "Player profile writes",
        &["operation", "outcome"],
    )
});

/// Subscription plan writes by operation and outcome
pub static PLAN_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "recruit_plan_writes_total",
        "Subscription plan writes",
        &["operation", "outcome"],
    )
});

/// Object storage existence probes by bucket and result
pub static STORAGE_PROBES: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "recruit_storage_probes_total",
        "Object storage existence probes",
        &["bucket", "result"],
    )
});

pub fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Render every registered metric in the Prometheus text format
pub fn render() -> String {
    // Counters register on first use
    Lazy::force(&PLAYER_WRITES);
    Lazy::force(&PLAN_WRITES);
    Lazy::force(&STORAGE_PROBES);

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_metrics_include_counters() {
        PLAN_WRITES.with_label_values(&["create", "ok"]).inc();
        let text = render();
        assert!(text.contains("recruit_plan_writes_total"));
        assert!(text.contains(r#"operation="create""#));
    }
}
