//! `devzero_workload_policy_target`: selects the workloads a workload
//! policy applies to

use super::selector::{selector_attribute, LabelSelectorModel};
use super::{decode_plan, decode_state, encode_state, Resource};
use crate::client::ClientSet;
use crate::convert;
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::proto::{
    CreateWorkloadPolicyTargetRequest, DeleteWorkloadPolicyTargetRequest,
    GetWorkloadPolicyTargetRequest, LabelSelector, RegexPattern, UpdateWorkloadPolicyTargetRequest,
    WorkloadPolicyTarget,
};
use crate::schema::{Attribute, Block, Schema};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

pub const TYPE_NAME: &str = "devzero_workload_policy_target";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadPolicyTargetModel {
    pub id: Option<String>,
    pub policy_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub enabled: Option<bool>,
    pub namespace_selector: Option<LabelSelectorModel>,
    pub workload_selector: Option<LabelSelectorModel>,
    pub kind_filter: Option<Vec<String>>,
    pub name_pattern: Option<NamePatternModel>,
    pub annotation_selector: Option<LabelSelectorModel>,
    pub workload_names: Option<Vec<String>>,
    pub node_group_names: Option<Vec<String>>,
    pub cluster_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamePatternModel {
    pub pattern: Option<String>,
    pub flags: Option<String>,
}

/// Wire form of the target fields shared by create and update requests.
struct TargetFields {
    namespace_selector: Option<LabelSelector>,
    workload_selector: Option<LabelSelector>,
    kind_filter: Vec<i32>,
    name_pattern: Option<RegexPattern>,
    annotation_selector: Option<LabelSelector>,
}

impl WorkloadPolicyTargetModel {
    fn id(&self) -> String {
        self.id.clone().unwrap_or_default()
    }

    fn wire_fields(&self) -> Result<TargetFields> {
        let kind_filter = self
            .kind_filter
            .iter()
            .flatten()
            .map(|k| convert::kind_to_wire(k).map(|k| k as i32))
            .collect::<Result<Vec<_>>>()?;

        Ok(TargetFields {
            namespace_selector: self.namespace_selector.as_ref().map(LabelSelectorModel::to_wire),
            workload_selector: self.workload_selector.as_ref().map(LabelSelectorModel::to_wire),
            kind_filter,
            name_pattern: self.name_pattern.as_ref().map(|p| RegexPattern {
                pattern: convert::string_to_wire(p.pattern.as_ref()),
                flags: convert::string_to_wire(p.flags.as_ref()),
            }),
            annotation_selector: self.annotation_selector.as_ref().map(LabelSelectorModel::to_wire),
        })
    }

    pub fn create_request(&self, team_id: &str) -> Result<CreateWorkloadPolicyTargetRequest> {
        let fields = self.wire_fields()?;
        Ok(CreateWorkloadPolicyTargetRequest {
            team_id: team_id.to_string(),
            policy_id: convert::string_to_wire(self.policy_id.as_ref()),
            name: convert::string_to_wire(self.name.as_ref()),
            description: convert::string_to_wire(self.description.as_ref()),
            priority: self.priority.unwrap_or_default(),
            enabled: self.enabled.unwrap_or_default(),
            namespace_selector: fields.namespace_selector,
            workload_selector: fields.workload_selector,
            kind_filter: fields.kind_filter,
            name_pattern: fields.name_pattern,
            annotation_selector: fields.annotation_selector,
            workload_names: convert::list_to_wire(self.workload_names.as_ref()),
            node_group_names: convert::list_to_wire(self.node_group_names.as_ref()),
            cluster_ids: convert::list_to_wire(self.cluster_ids.as_ref()),
        })
    }

    /// Node group names are not sent on update; the backend keeps the
    /// stored list.
    pub fn update_request(&self, team_id: &str) -> Result<UpdateWorkloadPolicyTargetRequest> {
        let fields = self.wire_fields()?;
        Ok(UpdateWorkloadPolicyTargetRequest {
            team_id: team_id.to_string(),
            target_id: self.id(),
            policy_id: self.policy_id.clone(),
            name: convert::string_to_wire(self.name.as_ref()),
            description: convert::string_to_wire(self.description.as_ref()),
            priority: self.priority.unwrap_or_default(),
            enabled: self.enabled.unwrap_or_default(),
            namespace_selector: fields.namespace_selector,
            workload_selector: fields.workload_selector,
            kind_filter: fields.kind_filter,
            name_pattern: fields.name_pattern,
            annotation_selector: fields.annotation_selector,
            workload_names: convert::list_to_wire(self.workload_names.as_ref()),
            node_group_names: Vec::new(),
            cluster_ids: convert::list_to_wire(self.cluster_ids.as_ref()),
        })
    }

    pub fn apply_wire(&mut self, target: &WorkloadPolicyTarget) {
        self.id = Some(target.target_id.clone());
        self.policy_id = Some(target.policy_id.clone());
        self.name = Some(target.name.clone());
        self.description = Some(target.description.clone());
        self.priority = Some(target.priority);
        self.enabled = Some(target.enabled);

        // Selectors and the name pattern only refresh blocks that are
        // already configured.
        for (slot, wire) in [
            (&mut self.namespace_selector, &target.namespace_selector),
            (&mut self.workload_selector, &target.workload_selector),
            (&mut self.annotation_selector, &target.annotation_selector),
        ] {
            if let (Some(model), Some(wire)) = (slot.as_mut(), wire) {
                *model = model.refreshed(wire);
            }
        }
        if let (Some(model), Some(wire)) = (self.name_pattern.as_mut(), &target.name_pattern) {
            model.pattern = convert::refresh_string(model.pattern.as_deref(), &wire.pattern);
            model.flags = convert::refresh_string(model.flags.as_deref(), &wire.flags);
        }

        self.kind_filter = Some(
            target
                .kind_filter
                .iter()
                .map(|k| convert::kind_from_wire(*k).to_string())
                .collect(),
        );
        self.workload_names = Some(target.workload_names.clone());
        self.node_group_names = Some(target.node_group_names.clone());
        self.cluster_ids = Some(target.cluster_ids.clone());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkloadPolicyTargetResource;

#[async_trait::async_trait]
impl Resource for WorkloadPolicyTargetResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let empty_list = || Attribute::string_list().default(json!([]));

        Schema::new(
            "Workload policy target resource",
            Block::new()
                .attribute(
                    "id",
                    Attribute::string()
                        .computed()
                        .use_state_for_unknown()
                        .describe("ID of the workload policy target"),
                )
                .attribute(
                    "policy_id",
                    Attribute::string().required().describe("ID of the workload policy"),
                )
                .attribute(
                    "name",
                    Attribute::string()
                        .required()
                        .describe("Name of the workload policy target"),
                )
                .attribute(
                    "description",
                    Attribute::string()
                        .default(json!(""))
                        .describe("Description of the workload policy target"),
                )
                .attribute(
                    "priority",
                    Attribute::int32()
                        .default(json!(0))
                        .describe("Priority of the workload policy target"),
                )
                .attribute(
                    "enabled",
                    Attribute::bool()
                        .default(json!(true))
                        .describe("Whether the workload policy target is enabled"),
                )
                .attribute(
                    "namespace_selector",
                    selector_attribute(false, "Namespace selector of the workload policy target"),
                )
                .attribute(
                    "workload_selector",
                    selector_attribute(false, "Workload selector of the workload policy target"),
                )
                .attribute(
                    "kind_filter",
                    empty_list().describe("Kind filter of the workload policy target"),
                )
                .attribute(
                    "name_pattern",
                    Attribute::object(
                        Block::new()
                            .attribute(
                                "pattern",
                                Attribute::string()
                                    .optional()
                                    .describe("Pattern of the regex pattern"),
                            )
                            .attribute(
                                "flags",
                                Attribute::string()
                                    .optional()
                                    .describe("Flags of the regex pattern"),
                            ),
                    )
                    .optional()
                    .describe("Name pattern of the workload policy target"),
                )
                .attribute(
                    "annotation_selector",
                    selector_attribute(false, "Annotation selector of the workload policy target"),
                )
                .attribute(
                    "workload_names",
                    empty_list().describe("Workload names of the workload policy target"),
                )
                .attribute(
                    "node_group_names",
                    empty_list().describe("Node group names of the workload policy target"),
                )
                .attribute(
                    "cluster_ids",
                    Attribute::string_list()
                        .required()
                        .describe("Cluster IDs of the workload policy target"),
                ),
        )
    }

    async fn create(&self, client: &ClientSet, plan: &Value) -> Result<Value> {
        let mut model: WorkloadPolicyTargetModel = decode_plan(plan)?;
        let request = model.create_request(&client.team_id)?;

        let response = client
            .api
            .create_workload_policy_target(request)
            .await
            .map_err(|s| ProviderError::client("create workload policy target", s))?;

        let target = response.target.ok_or_else(|| {
            ProviderError::EmptyResponse("Workload policy target not created".to_string())
        })?;
        model.apply_wire(&target);
        trace!(resource = TYPE_NAME, id = %target.target_id, "created a workload policy target");

        encode_state(&model)
    }

    async fn read(&self, client: &ClientSet, state: &Value) -> Result<Value> {
        let mut model: WorkloadPolicyTargetModel = decode_state(state)?;

        let response = client
            .api
            .get_workload_policy_target(GetWorkloadPolicyTargetRequest {
                team_id: client.team_id.clone(),
                target_id: model.id(),
            })
            .await
            .map_err(|s| ProviderError::client("get workload policy target", s))?;

        let target = response.target.ok_or_else(|| {
            ProviderError::NotFound("Workload policy target not found".to_string())
        })?;
        model.apply_wire(&target);

        encode_state(&model)
    }

    async fn update(&self, client: &ClientSet, plan: &Value, _prior: &Value) -> Result<Value> {
        let mut model: WorkloadPolicyTargetModel = decode_plan(plan)?;
        let request = model.update_request(&client.team_id)?;

        let response = client
            .api
            .update_workload_policy_target(request)
            .await
            .map_err(|s| ProviderError::client("update workload policy target", s))?;

        let target = response.target.ok_or_else(|| {
            ProviderError::EmptyResponse("Workload policy target not updated".to_string())
        })?;
        model.apply_wire(&target);

        encode_state(&model)
    }

    async fn delete(&self, client: &ClientSet, state: &Value) -> Result<Diagnostics> {
        let model: WorkloadPolicyTargetModel = decode_state(state)?;
        debug!(resource = TYPE_NAME, id = ?model.id, "Deleting workload policy target");

        client
            .api
            .delete_workload_policy_target(DeleteWorkloadPolicyTargetRequest {
                team_id: client.team_id.clone(),
                target_ids: vec![model.id()],
            })
            .await
            .map_err(|s| ProviderError::client("delete workload policy target", s))?;

        Ok(Diagnostics::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockFleetApi;
    use crate::proto::K8sObjectKind;
    use std::sync::Arc;

    fn setup() -> (MockFleetApi, ClientSet) {
        let api = MockFleetApi::new();
        let client = ClientSet::new("team-1", Arc::new(api.clone()));
        (api, client)
    }

    fn plan(config: serde_json::Value) -> Value {
        let schema = WorkloadPolicyTargetResource.schema();
        schema.plan(&schema.conform(&config).unwrap(), None)
    }

    fn frontends() -> Value {
        plan(json!({
            "policy_id": "wp-1",
            "name": "frontends",
            "namespace_selector": { "match_labels": { "env": "prod" } },
            "kind_filter": ["Deployment", "Rollout"],
            "name_pattern": { "pattern": "^web-.*", "flags": "i" },
            "node_group_names": ["general"],
            "cluster_ids": ["cluster-1"],
        }))
    }

    #[test]
    fn test_defaults() {
        let model: WorkloadPolicyTargetModel = plan(json!({
            "policy_id": "wp-1",
            "name": "all",
            "cluster_ids": ["cluster-1"],
        }))
        .decode()
        .unwrap();

        assert_eq!(model.priority, Some(0));
        assert_eq!(model.enabled, Some(true));
        assert_eq!(model.kind_filter, Some(vec![]));
        assert_eq!(model.workload_names, Some(vec![]));
        assert!(model.namespace_selector.is_none());
    }

    #[test]
    fn test_selector_expressions_are_lenient() {
        let schema = WorkloadPolicyTargetResource.schema();
        let config = json!({
            "policy_id": "wp-1",
            "name": "t",
            "cluster_ids": [],
            "workload_selector": { "match_expressions": [{ "values": ["a"] }] },
        });
        assert!(schema.conform(&config).is_ok());
    }

    #[test]
    fn test_kinds_map_to_wire() {
        let model: WorkloadPolicyTargetModel = frontends().decode().unwrap();
        let request = model.create_request("team-1").unwrap();

        assert_eq!(
            request.kind_filter,
            vec![K8sObjectKind::Deployment as i32, K8sObjectKind::ArgoRollout as i32]
        );
        assert_eq!(request.name_pattern.unwrap().pattern, "^web-.*");
        assert_eq!(request.node_group_names, vec!["general"]);
    }

    #[test]
    fn test_unknown_kind_is_a_conversion_error() {
        let model = WorkloadPolicyTargetModel {
            kind_filter: Some(vec!["Foo".to_string()]),
            ..Default::default()
        };
        let err = model.create_request("team-1").unwrap_err();
        assert_eq!(err.to_string(), "Unable to convert kind filter: invalid kind: Foo");
    }

    #[test]
    fn test_update_request_omits_node_groups() {
        let mut model: WorkloadPolicyTargetModel = frontends().decode().unwrap();
        model.id = Some("wpt-1".to_string());

        let request = model.update_request("team-1").unwrap();
        assert_eq!(request.target_id, "wpt-1");
        assert_eq!(request.policy_id.as_deref(), Some("wp-1"));
        assert!(request.node_group_names.is_empty());
    }

    #[test]
    fn test_unconfigured_selectors_stay_null() {
        let mut model = WorkloadPolicyTargetModel::default();
        model.apply_wire(&WorkloadPolicyTarget {
            target_id: "wpt-1".to_string(),
            workload_selector: Some(LabelSelector::default()),
            name_pattern: Some(RegexPattern::default()),
            kind_filter: vec![0],
            ..Default::default()
        });

        assert!(model.workload_selector.is_none());
        assert!(model.name_pattern.is_none());
        assert_eq!(model.kind_filter, Some(vec![convert::UNSPECIFIED_KIND.to_string()]));
    }

    #[test]
    fn test_name_pattern_without_flags_reads_back_unset() {
        let mut model: WorkloadPolicyTargetModel = frontends().decode().unwrap();
        model.name_pattern = Some(NamePatternModel {
            pattern: Some("^api-".to_string()),
            flags: None,
        });
        model.id = Some("wpt-1".to_string());
        let configured = model.name_pattern.clone();

        let request = model.create_request("team-1").unwrap();
        assert_eq!(request.name_pattern.as_ref().unwrap().flags, "");

        model.apply_wire(&WorkloadPolicyTarget {
            target_id: "wpt-1".to_string(),
            name_pattern: request.name_pattern,
            ..Default::default()
        });
        assert_eq!(model.name_pattern, configured);
    }

    #[tokio::test]
    async fn test_lifecycle_keeps_node_groups_on_update() {
        let (api, client) = setup();

        let state = WorkloadPolicyTargetResource.create(&client, &frontends()).await.unwrap();
        let id = state.get("id").as_str().unwrap().to_string();

        let refreshed = WorkloadPolicyTargetResource.read(&client, &state).await.unwrap();
        assert_eq!(refreshed, state);

        let mut planned = state.clone();
        planned.set("priority", Value::Number(5.into()));
        let updated = WorkloadPolicyTargetResource
            .update(&client, &planned, &state)
            .await
            .unwrap();

        assert_eq!(updated.get("priority"), &Value::Number(5.into()));
        assert_eq!(api.workload_target(&id).unwrap().node_group_names, vec!["general"]);
        assert_eq!(updated.get("node_group_names"), state.get("node_group_names"));

        WorkloadPolicyTargetResource.delete(&client, &updated).await.unwrap();
        assert!(api.workload_target(&id).is_none());
        assert_eq!(api.call_count("delete_workload_policy_target"), 1);
    }

    #[tokio::test]
    async fn test_read_missing_target() {
        let (_, client) = setup();
        let err = WorkloadPolicyTargetResource
            .read(&client, &WorkloadPolicyTargetResource.import_state("wpt-404"))
            .await
            .unwrap_err();
        assert!(err.is_remote());
    }
}
