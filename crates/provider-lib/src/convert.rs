//! Value conversions between resource models and wire messages
//!
//! Enum tables are kept as `(variant, label)` pairs so that both
//! directions are derived from a single listing.

use crate::error::{ProviderError, Result};
use crate::proto::{
    ActionTrigger, HpaMetricType, InstanceStorePolicy, K8sObjectKind, LabelSelectorOperator,
    WorkloadDetectionTrigger,
};
use std::collections::{BTreeMap, HashMap};

pub const LABEL_SELECTOR_OPERATORS: &[(LabelSelectorOperator, &str)] = &[
    (LabelSelectorOperator::In, "In"),
    (LabelSelectorOperator::NotIn, "NotIn"),
    (LabelSelectorOperator::Exists, "Exists"),
    (LabelSelectorOperator::DoesNotExist, "DoesNotExist"),
    (LabelSelectorOperator::Gt, "Gt"),
    (LabelSelectorOperator::Lt, "Lt"),
];

pub const ACTION_TRIGGERS: &[(ActionTrigger, &str)] = &[
    (ActionTrigger::OnSchedule, "on_schedule"),
    (ActionTrigger::OnDetection, "on_detection"),
];

pub const DETECTION_TRIGGERS: &[(WorkloadDetectionTrigger, &str)] = &[
    (WorkloadDetectionTrigger::DetectionTriggerPodCreation, "pod_creation"),
    (WorkloadDetectionTrigger::DetectionTriggerPodUpdate, "pod_update"),
];

pub const HPA_METRICS: &[(HpaMetricType, &str)] = &[
    (HpaMetricType::Cpu, "cpu"),
    (HpaMetricType::Memory, "memory"),
    (HpaMetricType::Gpu, "gpu"),
    (HpaMetricType::Network, "network"),
];

pub const INSTANCE_STORE_POLICIES: &[(InstanceStorePolicy, &str)] =
    &[(InstanceStorePolicy::Raid0, "RAID0")];

pub const K8S_OBJECT_KINDS: &[(K8sObjectKind, &str)] = &[
    (K8sObjectKind::Pod, "Pod"),
    (K8sObjectKind::Job, "Job"),
    (K8sObjectKind::Deployment, "Deployment"),
    (K8sObjectKind::StatefulSet, "StatefulSet"),
    (K8sObjectKind::DaemonSet, "DaemonSet"),
    (K8sObjectKind::ReplicaSet, "ReplicaSet"),
    (K8sObjectKind::CronJob, "CronJob"),
    (K8sObjectKind::ReplicationController, "ReplicationController"),
    (K8sObjectKind::ArgoRollout, "Rollout"),
];

/// Label emitted for wire values outside an action or detection trigger table.
pub const UNSPECIFIED_TRIGGER: &str = "unspecified";

/// Label emitted for an unspecified workload kind.
pub const UNSPECIFIED_KIND: &str = "Unspecified";

/// Labels of a table, in declaration order.
pub fn labels<E>(table: &[(E, &'static str)]) -> Vec<&'static str> {
    table.iter().map(|(_, label)| *label).collect()
}

fn label_of<E: PartialEq>(table: &[(E, &'static str)], value: E) -> Option<&'static str> {
    table.iter().find(|(v, _)| *v == value).map(|(_, label)| *label)
}

fn variant_of<E: Copy>(table: &[(E, &'static str)], label: &str) -> Option<E> {
    table.iter().find(|(_, l)| *l == label).map(|(v, _)| *v)
}

pub fn operator_to_wire(label: &str) -> LabelSelectorOperator {
    variant_of(LABEL_SELECTOR_OPERATORS, label).unwrap_or(LabelSelectorOperator::Unspecified)
}

/// Empty for unspecified or unrecognized operators.
pub fn operator_from_wire(raw: i32) -> &'static str {
    let operator = LabelSelectorOperator::try_from(raw).unwrap_or_default();
    label_of(LABEL_SELECTOR_OPERATORS, operator).unwrap_or("")
}

pub fn action_trigger_to_wire(label: &str) -> Result<ActionTrigger> {
    variant_of(ACTION_TRIGGERS, label).ok_or_else(|| {
        ProviderError::conversion("action triggers", format!("invalid action trigger: {label}"))
    })
}

pub fn action_trigger_from_wire(raw: i32) -> &'static str {
    ActionTrigger::try_from(raw)
        .ok()
        .and_then(|t| label_of(ACTION_TRIGGERS, t))
        .unwrap_or(UNSPECIFIED_TRIGGER)
}

pub fn detection_trigger_to_wire(label: &str) -> Result<WorkloadDetectionTrigger> {
    variant_of(DETECTION_TRIGGERS, label).ok_or_else(|| {
        ProviderError::conversion(
            "detection triggers",
            format!("invalid detection trigger: {label}"),
        )
    })
}

pub fn detection_trigger_from_wire(raw: i32) -> &'static str {
    WorkloadDetectionTrigger::try_from(raw)
        .ok()
        .and_then(|t| label_of(DETECTION_TRIGGERS, t))
        .unwrap_or(UNSPECIFIED_TRIGGER)
}

/// `None` for strings outside the metric table; the field is then left unset.
pub fn hpa_metric_to_wire(label: &str) -> Option<HpaMetricType> {
    variant_of(HPA_METRICS, label)
}

pub fn hpa_metric_from_wire(raw: i32) -> Option<&'static str> {
    HpaMetricType::try_from(raw)
        .ok()
        .and_then(|m| label_of(HPA_METRICS, m))
}

/// RAID0 is the only store policy the backend accepts.
pub fn instance_store_policy_to_wire(_label: &str) -> InstanceStorePolicy {
    InstanceStorePolicy::Raid0
}

pub fn instance_store_policy_from_wire(raw: i32) -> Option<&'static str> {
    InstanceStorePolicy::try_from(raw)
        .ok()
        .and_then(|p| label_of(INSTANCE_STORE_POLICIES, p))
}

pub fn kind_to_wire(label: &str) -> Result<K8sObjectKind> {
    variant_of(K8S_OBJECT_KINDS, label)
        .ok_or_else(|| ProviderError::conversion("kind filter", format!("invalid kind: {label}")))
}

pub fn kind_from_wire(raw: i32) -> &'static str {
    let kind = K8sObjectKind::try_from(raw).unwrap_or_default();
    label_of(K8S_OBJECT_KINDS, kind).unwrap_or(UNSPECIFIED_KIND)
}

/// Empty wire strings read back as unset.
pub fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Like [`non_empty`], but an empty wire string keeps a configured `""`.
pub fn refresh_string(current: Option<&str>, wire: &str) -> Option<String> {
    match current {
        Some("") if wire.is_empty() => Some(String::new()),
        _ => non_empty(wire),
    }
}

/// Empty wire lists read back as unset.
pub fn non_empty_list(items: &[String]) -> Option<Vec<String>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// Empty wire maps read back as unset.
pub fn non_empty_map(map: &HashMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then(|| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

pub fn map_to_wire(map: Option<&BTreeMap<String, String>>) -> HashMap<String, String> {
    map.map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

pub fn list_to_wire(items: Option<&Vec<String>>) -> Vec<String> {
    items.cloned().unwrap_or_default()
}

pub fn string_to_wire(s: Option<&String>) -> String {
    s.cloned().unwrap_or_default()
}

/// Float attributes are carried as `f32` on the wire.
pub fn narrow(value: Option<f64>) -> Option<f32> {
    value.map(|v| v as f32)
}

/// Widens through the shortest decimal form so `0.05f32` reads back as `0.05`.
pub fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}

pub fn widen_opt(value: Option<f32>) -> Option<f64> {
    value.map(widen)
}

/// Overwrites `slot` only when the wire carried a value.
pub fn merge<T>(slot: &mut Option<T>, wire: Option<T>) {
    if wire.is_some() {
        *slot = wire;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_table_is_total_and_reversible() {
        for (variant, label) in LABEL_SELECTOR_OPERATORS {
            assert_eq!(operator_to_wire(label), *variant);
            assert_eq!(operator_from_wire(*variant as i32), *label);
        }
        assert_eq!(operator_to_wire("Matches"), LabelSelectorOperator::Unspecified);
        assert_eq!(operator_from_wire(0), "");
        assert_eq!(operator_from_wire(99), "");
    }

    #[test]
    fn test_tables_are_injective() {
        fn assert_unique<E>(table: &[(E, &'static str)]) {
            let mut seen = labels(table);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), table.len());
        }
        assert_unique(LABEL_SELECTOR_OPERATORS);
        assert_unique(ACTION_TRIGGERS);
        assert_unique(DETECTION_TRIGGERS);
        assert_unique(HPA_METRICS);
        assert_unique(K8S_OBJECT_KINDS);
    }

    #[test]
    fn test_action_trigger_rejects_unknown_label() {
        assert_eq!(action_trigger_to_wire("on_detection").unwrap(), ActionTrigger::OnDetection);
        let err = action_trigger_to_wire("hourly").unwrap_err();
        assert!(err.to_string().contains("invalid action trigger: hourly"));
        assert_eq!(action_trigger_from_wire(0), UNSPECIFIED_TRIGGER);
        assert_eq!(action_trigger_from_wire(7), UNSPECIFIED_TRIGGER);
    }

    #[test]
    fn test_detection_trigger_mapping() {
        assert_eq!(
            detection_trigger_to_wire("pod_update").unwrap(),
            WorkloadDetectionTrigger::DetectionTriggerPodUpdate
        );
        assert!(detection_trigger_to_wire("node_update").is_err());
        assert_eq!(detection_trigger_from_wire(1), "pod_creation");
        assert_eq!(detection_trigger_from_wire(0), UNSPECIFIED_TRIGGER);
    }

    #[test]
    fn test_hpa_metric_mapping() {
        assert_eq!(hpa_metric_to_wire("gpu"), Some(HpaMetricType::Gpu));
        assert_eq!(hpa_metric_to_wire("disk"), None);
        assert_eq!(hpa_metric_from_wire(HpaMetricType::Network as i32), Some("network"));
        assert_eq!(hpa_metric_from_wire(0), None);
    }

    #[test]
    fn test_instance_store_policy_always_raid0() {
        assert_eq!(instance_store_policy_to_wire("RAID0"), InstanceStorePolicy::Raid0);
        assert_eq!(instance_store_policy_to_wire("anything"), InstanceStorePolicy::Raid0);
        assert_eq!(instance_store_policy_from_wire(1), Some("RAID0"));
        assert_eq!(instance_store_policy_from_wire(0), None);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(kind_to_wire("Rollout").unwrap(), K8sObjectKind::ArgoRollout);
        assert_eq!(kind_from_wire(K8sObjectKind::CronJob as i32), "CronJob");
        assert_eq!(kind_from_wire(0), UNSPECIFIED_KIND);
        assert_eq!(kind_from_wire(1000), UNSPECIFIED_KIND);

        let err = kind_to_wire("Foo").unwrap_err();
        assert_eq!(err.to_string(), "Unable to convert kind filter: invalid kind: Foo");
    }

    #[test]
    fn test_widen_keeps_decimal_form() {
        assert_eq!(widen(0.05f32), 0.05);
        assert_eq!(widen(1.2f32), 1.2);
        assert_eq!(narrow(Some(0.05)), Some(0.05f32));
    }

    #[test]
    fn test_empty_wire_collections_read_as_unset() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty_list(&[]), None);
        assert_eq!(non_empty_map(&HashMap::new()), None);
        assert_eq!(non_empty("m5"), Some("m5".to_string()));
    }

    #[test]
    fn test_refresh_string_keeps_configured_empty() {
        assert_eq!(refresh_string(Some(""), ""), Some(String::new()));
        assert_eq!(refresh_string(None, ""), None);
        assert_eq!(refresh_string(Some("i"), ""), None);
        assert_eq!(refresh_string(Some(""), "i"), Some("i".to_string()));
    }

    #[test]
    fn test_merge_keeps_existing_without_wire_value() {
        let mut slot = Some(3);
        merge(&mut slot, None);
        assert_eq!(slot, Some(3));
        merge(&mut slot, Some(4));
        assert_eq!(slot, Some(4));
    }
}
