//! Integration tests for full resource lifecycles against the in-memory fleet API

use provider_lib::{
    client::{ClientSet, MockFleetApi},
    driver::{self, Driver, PlanAction, PlannedChange},
    DevzeroProvider, ProviderError, Resource, Value,
};
use serde_json::json;
use std::sync::Arc;

fn setup() -> (MockFleetApi, Driver, DevzeroProvider) {
    let api = MockFleetApi::new();
    let client = ClientSet::new("team-1", Arc::new(api.clone()));
    (api, Driver::new(client), DevzeroProvider::new("test"))
}

/// Creates the resource from `config`, then plans the same config again.
async fn apply_and_replan(
    driver: &Driver,
    resource: &dyn Resource,
    config: &serde_json::Value,
) -> (Value, PlannedChange) {
    let change = driver.plan(resource, config, None).unwrap();
    assert_eq!(change.action, PlanAction::Create);
    let state = driver.apply(resource, &change).await.unwrap();
    let again = driver.plan(resource, config, Some(&state.to_json())).unwrap();
    (state, again)
}

#[tokio::test]
async fn test_cluster_lifecycle() {
    let (api, driver, provider) = setup();
    let cluster = provider.resource("devzero_cluster").unwrap();

    let change = driver.plan(cluster.as_ref(), &json!({"name": "prod"}), None).unwrap();
    let state = driver.apply(cluster.as_ref(), &change).await.unwrap();

    let id = state.get("id").as_str().unwrap().to_string();
    assert!(api.cluster(&id).is_some());
    assert!(!state.get("token").as_str().unwrap_or_default().is_empty());

    let renamed = driver
        .plan(cluster.as_ref(), &json!({"name": "prod-eu"}), Some(&state.to_json()))
        .unwrap();
    assert_eq!(renamed.action, PlanAction::Update);
    assert_eq!(renamed.planned.get("id"), state.get("id"));

    let state = driver.apply(cluster.as_ref(), &renamed).await.unwrap();
    assert_eq!(state.get("name").as_str(), Some("prod-eu"));

    let warnings = driver.destroy(cluster.as_ref(), &state.to_json()).await.unwrap();
    assert!(warnings.is_empty());
    assert!(api.cluster(&id).is_none());
}

#[tokio::test]
async fn test_node_policy_and_target() {
    let (api, driver, provider) = setup();
    let policy = provider.resource("devzero_node_policy").unwrap();
    let target = provider.resource("devzero_node_policy_target").unwrap();

    let change = driver
        .plan(
            policy.as_ref(),
            &json!({
                "name": "general",
                "instance_categories": { "match_expressions": [
                    { "key": "karpenter.k8s.aws/instance-category", "operator": "In", "values": ["c", "m"] }
                ]},
                "aws": { "role": "KarpenterNodeRole" }
            }),
            None,
        )
        .unwrap();
    let policy_state = driver.apply(policy.as_ref(), &change).await.unwrap();
    let policy_id = policy_state.get("id").as_str().unwrap().to_string();
    assert_eq!(api.node_policy(&policy_id).unwrap().team_id, "team-1");

    let change = driver
        .plan(
            target.as_ref(),
            &json!({
                "policy_id": policy_id,
                "name": "everywhere",
                "cluster_ids": ["cluster-1"]
            }),
            None,
        )
        .unwrap();
    let target_state = driver.apply(target.as_ref(), &change).await.unwrap();
    assert_eq!(target_state.get("policy_id").as_str(), Some(policy_id.as_str()));

    let warnings = driver.destroy(target.as_ref(), &target_state.to_json()).await.unwrap();
    assert_eq!(warnings.len(), 1);
    let warnings = driver.destroy(policy.as_ref(), &policy_state.to_json()).await.unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(api.node_policy(&policy_id).is_some());
}

#[tokio::test]
async fn test_disabled_node_policy_target_replans_as_noop() {
    let (api, driver, provider) = setup();
    let target = provider.resource("devzero_node_policy_target").unwrap();

    let config = json!({
        "policy_id": "np-1",
        "name": "two-clusters",
        "enabled": false,
        "cluster_ids": ["c1", "c2"]
    });
    let (state, again) = apply_and_replan(&driver, target.as_ref(), &config).await;

    let id = state.get("id").as_str().unwrap().to_string();
    let stored = api.node_policy_target(&id).unwrap();
    assert!(!stored.enabled);
    assert_eq!(stored.cluster_ids, vec!["c1", "c2"]);
    assert_eq!(again.action, PlanAction::NoOp, "planned: {}", again.planned.to_json());
}

#[tokio::test]
async fn test_fully_populated_node_policy_replans_as_noop() {
    let (api, driver, provider) = setup();
    let policy = provider.resource("devzero_node_policy").unwrap();

    let config = json!({
        "name": "gpu",
        "description": "GPU nodes",
        "weight": 50,
        "instance_families": { "match_expressions": [
            { "key": "karpenter.k8s.aws/instance-family", "operator": "In", "values": ["p4d", "g5"] }
        ]},
        "instance_cpus": { "match_expressions": [
            { "key": "karpenter.k8s.aws/instance-cpu", "operator": "Gt", "values": ["8"] }
        ]},
        "zones": { "match_labels": { "topology.kubernetes.io/region": "us-east-1" } },
        "architectures": {
            "match_labels": {},
            "match_expressions": [{ "key": "kubernetes.io/arch", "operator": "Exists", "values": [] }]
        },
        "capacity_types": { "match_expressions": [
            { "key": "karpenter.sh/capacity-type", "operator": "In", "values": ["spot", "on-demand"] }
        ]},
        "zones_tip": "east only",
        "labels": { "pool": "gpu" },
        "taints": [{ "key": "nvidia.com/gpu", "value": "true", "effect": "NoSchedule" }],
        "disruption": {
            "consolidate_after": "5m",
            "consolidation_policy": "WhenEmpty",
            "budgets": [
                { "reasons": ["Underutilized"], "nodes": "10%" },
                { "nodes": "0", "schedule": "0 9 * * mon-fri", "duration": "8h" }
            ]
        },
        "limits": { "cpu": "", "memory": "1000Gi" },
        "node_pool_name": "gpu-pool",
        "aws": {
            "role": "KarpenterNodeRole",
            "ami_family": "AL2",
            "subnet_selector_terms": [{ "tags": { "karpenter.sh/discovery": "prod" } }],
            "security_group_selector_terms": [{ "id": "sg-123" }],
            "tags": { "team": "ml" },
            "block_device_mappings": [{
                "device_name": "/dev/xvda",
                "ebs": { "volume_size": "100Gi", "volume_type": "gp3", "iops": 3000, "encrypted": true }
            }],
            "instance_store_policy": "raid0",
            "detailed_monitoring": true
        },
        "azure": {
            "vnet_subnet_id": "/subscriptions/s/vnets/v/subnets/nodes",
            "os_disk_size_gb": 128,
            "image_family": "Ubuntu2204",
            "fips_mode": "Disabled",
            "tags": { "env": "prod" },
            "max_pods": 110
        },
        "raw": [{ "nodepool_yaml": "kind: NodePool" }]
    });
    let (state, again) = apply_and_replan(&driver, policy.as_ref(), &config).await;

    let id = state.get("id").as_str().unwrap().to_string();
    let stored = api.node_policy(&id).unwrap();
    assert_eq!(stored.taints.len(), 1);
    assert_eq!(stored.disruption.unwrap().budgets.len(), 2);
    assert_eq!(again.action, PlanAction::NoOp, "planned: {}", again.planned.to_json());

    let refreshed = driver.read(policy.as_ref(), &state.to_json()).await.unwrap();
    assert_eq!(refreshed, state);
}

#[tokio::test]
async fn test_workload_target_with_bare_name_pattern_replans_as_noop() {
    let (api, driver, provider) = setup();
    let target = provider.resource("devzero_workload_policy_target").unwrap();

    let config = json!({
        "policy_id": "wp-1",
        "name": "api-workloads",
        "name_pattern": { "pattern": "^api-" },
        "cluster_ids": ["c1"]
    });
    let (state, again) = apply_and_replan(&driver, target.as_ref(), &config).await;

    let id = state.get("id").as_str().unwrap().to_string();
    assert_eq!(api.workload_target(&id).unwrap().name_pattern.unwrap().flags, "");
    assert!(state.get("name_pattern").get("flags").is_null());
    assert_eq!(again.action, PlanAction::NoOp, "planned: {}", again.planned.to_json());
}

#[tokio::test]
async fn test_workload_policy_and_target() {
    let (api, driver, provider) = setup();
    let policy = provider.resource("devzero_workload_policy").unwrap();
    let target = provider.resource("devzero_workload_policy_target").unwrap();

    let config = json!({
        "name": "rightsizing",
        "action_triggers": ["on_schedule"],
        "cpu_vertical_scaling": { "target_percentile": 0.95 }
    });
    let change = driver.plan(policy.as_ref(), &config, None).unwrap();
    let policy_state = driver.apply(policy.as_ref(), &change).await.unwrap();
    let policy_id = policy_state.get("id").as_str().unwrap().to_string();

    let again = driver
        .plan(policy.as_ref(), &config, Some(&policy_state.to_json()))
        .unwrap();
    assert_eq!(again.action, PlanAction::NoOp);

    let change = driver
        .plan(
            target.as_ref(),
            &json!({
                "policy_id": policy_id,
                "name": "frontends",
                "kind_filter": ["Deployment"],
                "node_group_names": ["general"],
                "cluster_ids": ["cluster-1"]
            }),
            None,
        )
        .unwrap();
    let target_state = driver.apply(target.as_ref(), &change).await.unwrap();
    let target_id = target_state.get("id").as_str().unwrap().to_string();
    assert_eq!(api.workload_target(&target_id).unwrap().node_group_names, vec!["general"]);

    driver.destroy(target.as_ref(), &target_state.to_json()).await.unwrap();
    assert!(api.workload_target(&target_id).is_none());

    driver.destroy(policy.as_ref(), &policy_state.to_json()).await.unwrap();
    assert!(api.workload_policy(&policy_id).is_none());
}

#[tokio::test]
async fn test_import_reads_remote_record() {
    let (_, driver, provider) = setup();
    let cluster = provider.resource("devzero_cluster").unwrap();

    let change = driver.plan(cluster.as_ref(), &json!({"name": "prod"}), None).unwrap();
    let created = driver.apply(cluster.as_ref(), &change).await.unwrap();

    let imported = driver
        .import(cluster.as_ref(), created.get("id").as_str().unwrap())
        .await
        .unwrap();
    assert_eq!(imported.get("name").as_str(), Some("prod"));
}

#[tokio::test]
async fn test_read_of_deleted_record_fails_remotely() {
    let (_, driver, provider) = setup();
    let policy = provider.resource("devzero_workload_policy").unwrap();

    let err = driver
        .read(policy.as_ref(), &json!({"id": "wp-missing"}))
        .await
        .unwrap_err();
    assert!(err.is_remote());
}

#[test]
fn test_invalid_config_is_rejected_offline() {
    let provider = DevzeroProvider::new("test");
    let target = provider.resource("devzero_workload_policy_target").unwrap();

    let err = driver::validate(
        target.as_ref(),
        &json!({ "policy_id": "wp-1", "cluster_ids": [], "priority": "high" }),
    )
    .unwrap_err();
    match err {
        ProviderError::Validation(diags) => assert_eq!(diags.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_blocking_apply_outside_runtime() {
    let (api, driver, provider) = setup();
    let cluster = provider.resource("devzero_cluster").unwrap();
    let change = driver::plan(cluster.as_ref(), &json!({"name": "batch"}), None).unwrap();

    let state = tokio_test::block_on(driver.apply(cluster.as_ref(), &change)).unwrap();

    assert_eq!(api.call_count("create_cluster"), 1);
    assert_eq!(state.get("name").as_str(), Some("batch"));
}
