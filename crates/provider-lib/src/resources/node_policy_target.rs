//! `devzero_node_policy_target`: binds a node policy to clusters

use super::{decode_plan, decode_state, encode_state, Resource};
use crate::client::ClientSet;
use crate::convert;
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::proto::{
    CreateNodePolicyTargetsRequest, ListNodePolicyTargetsRequest, NodePolicyTarget,
    UpdateNodePolicyTargetRequest,
};
use crate::schema::{Attribute, Block, Schema};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{trace, warn};

pub const TYPE_NAME: &str = "devzero_node_policy_target";

pub const DELETE_WARNING: &str =
    "Node policy target delete is a no-op operation. The target will remain in the backend.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePolicyTargetModel {
    pub id: Option<String>,
    pub policy_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub cluster_ids: Option<Vec<String>>,
}

impl NodePolicyTargetModel {
    pub fn to_wire(&self, team_id: &str) -> NodePolicyTarget {
        NodePolicyTarget {
            target_id: convert::string_to_wire(self.id.as_ref()),
            name: convert::string_to_wire(self.name.as_ref()),
            description: convert::string_to_wire(self.description.as_ref()),
            team_id: team_id.to_string(),
            cluster_ids: convert::list_to_wire(self.cluster_ids.as_ref()),
            policy_id: convert::string_to_wire(self.policy_id.as_ref()),
            enabled: self.enabled.unwrap_or_default(),
        }
    }

    pub fn apply_wire(&mut self, target: &NodePolicyTarget) {
        self.id = Some(target.target_id.clone());
        self.policy_id = Some(target.policy_id.clone());
        self.name = Some(target.name.clone());
        self.description = Some(target.description.clone());
        self.enabled = Some(target.enabled);
        self.cluster_ids = Some(target.cluster_ids.clone());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodePolicyTargetResource;

#[async_trait::async_trait]
impl Resource for NodePolicyTargetResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Attaches a node policy to specific clusters. Node policy targets determine which clusters a node policy applies to.",
            Block::new()
                .attribute(
                    "id",
                    Attribute::string()
                        .computed()
                        .use_state_for_unknown()
                        .describe("Unique identifier of the node policy target"),
                )
                .attribute(
                    "policy_id",
                    Attribute::string()
                        .required()
                        .describe("Node policy to attach this target to"),
                )
                .attribute(
                    "name",
                    Attribute::string()
                        .required()
                        .describe("Human-friendly name for the target"),
                )
                .attribute(
                    "description",
                    Attribute::string()
                        .default(json!(""))
                        .describe("Free-form description of the target"),
                )
                .attribute(
                    "enabled",
                    Attribute::bool()
                        .default(json!(true))
                        .describe("Whether this target is active"),
                )
                .attribute(
                    "cluster_ids",
                    Attribute::string_list()
                        .required()
                        .describe("List of cluster IDs to apply the node policy to"),
                ),
        )
    }

    async fn create(&self, client: &ClientSet, plan: &Value) -> Result<Value> {
        let mut model: NodePolicyTargetModel = decode_plan(plan)?;

        let response = client
            .api
            .create_node_policy_targets(CreateNodePolicyTargetsRequest {
                targets: vec![model.to_wire(&client.team_id)],
            })
            .await
            .map_err(|s| ProviderError::client("create node policy target", s))?;

        let target = response.targets.first().ok_or_else(|| {
            ProviderError::EmptyResponse("Node policy target not created".to_string())
        })?;
        model.apply_wire(target);
        trace!(resource = TYPE_NAME, id = %target.target_id, "created a node policy target");

        encode_state(&model)
    }

    async fn read(&self, client: &ClientSet, state: &Value) -> Result<Value> {
        let mut model: NodePolicyTargetModel = decode_state(state)?;
        let id = model.id.clone().unwrap_or_default();

        let response = client
            .api
            .list_node_policy_targets(ListNodePolicyTargetsRequest {
                team_id: client.team_id.clone(),
            })
            .await
            .map_err(|s| ProviderError::client("list node policy targets", s))?;

        let target = response
            .targets
            .iter()
            .find(|t| t.target_id == id)
            .ok_or_else(|| ProviderError::NotFound("Node policy target not found".to_string()))?;
        model.apply_wire(target);

        encode_state(&model)
    }

    async fn update(&self, client: &ClientSet, plan: &Value, _prior: &Value) -> Result<Value> {
        let mut model: NodePolicyTargetModel = decode_plan(plan)?;

        let response = client
            .api
            .update_node_policy_target(UpdateNodePolicyTargetRequest {
                target: Some(model.to_wire(&client.team_id)),
            })
            .await
            .map_err(|s| ProviderError::client("update node policy target", s))?;

        let target = response.target.ok_or_else(|| {
            ProviderError::EmptyResponse("Node policy target not updated".to_string())
        })?;
        model.apply_wire(&target);

        encode_state(&model)
    }

    async fn delete(&self, _client: &ClientSet, state: &Value) -> Result<Diagnostics> {
        let model: NodePolicyTargetModel = decode_state(state)?;
        warn!(resource = TYPE_NAME, id = ?model.id, "{}", DELETE_WARNING);

        let mut diags = Diagnostics::new();
        diags.add_warning("No-op delete", DELETE_WARNING);
        Ok(diags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockFleetApi;
    use std::sync::Arc;
    use tonic::Status;

    fn setup() -> (MockFleetApi, ClientSet) {
        let api = MockFleetApi::new();
        let client = ClientSet::new("team-1", Arc::new(api.clone()));
        (api, client)
    }

    fn plan(config: serde_json::Value) -> Value {
        let schema = NodePolicyTargetResource.schema();
        schema.plan(&schema.conform(&config).unwrap(), None)
    }

    fn production() -> Value {
        plan(json!({
            "policy_id": "np-1",
            "name": "production",
            "cluster_ids": ["cluster-a", "cluster-b"],
        }))
    }

    #[test]
    fn test_defaults_enable_target() {
        let model: NodePolicyTargetModel = production().decode().unwrap();
        assert_eq!(model.enabled, Some(true));
        assert_eq!(model.description.as_deref(), Some(""));
    }

    #[test]
    fn test_to_wire_carries_team() {
        let model: NodePolicyTargetModel = production().decode().unwrap();
        let wire = model.to_wire("team-1");

        assert_eq!(wire.team_id, "team-1");
        assert_eq!(wire.policy_id, "np-1");
        assert!(wire.target_id.is_empty());
        assert_eq!(wire.cluster_ids, vec!["cluster-a", "cluster-b"]);
    }

    #[test]
    fn test_empty_cluster_list_reads_back_as_empty() {
        let mut model = NodePolicyTargetModel::default();
        model.apply_wire(&NodePolicyTarget {
            target_id: "npt-1".to_string(),
            ..Default::default()
        });
        assert_eq!(model.cluster_ids, Some(vec![]));
        assert_eq!(model.enabled, Some(false));
    }

    #[tokio::test]
    async fn test_create_read_update() {
        let (api, client) = setup();

        let state = NodePolicyTargetResource.create(&client, &production()).await.unwrap();
        let id = state.get("id").as_str().unwrap().to_string();
        assert_eq!(api.node_policy_target(&id).unwrap().team_id, "team-1");

        let refreshed = NodePolicyTargetResource.read(&client, &state).await.unwrap();
        assert_eq!(refreshed, state);

        let mut planned = state.clone();
        planned.set("enabled", Value::Bool(false));
        let updated = NodePolicyTargetResource
            .update(&client, &planned, &state)
            .await
            .unwrap();
        assert_eq!(updated.get("enabled").as_bool(), Some(false));
        assert!(!api.node_policy_target(&id).unwrap().enabled);
    }

    #[tokio::test]
    async fn test_read_missing_target() {
        let (_, client) = setup();
        let err = NodePolicyTargetResource
            .read(&client, &NodePolicyTargetResource.import_state("npt-9"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Node policy target not found");
    }

    #[tokio::test]
    async fn test_list_failure_surfaces_status() {
        let (api, client) = setup();
        api.fail_next("list_node_policy_targets", Status::unavailable("down"));

        let err = NodePolicyTargetResource
            .read(&client, &NodePolicyTargetResource.import_state("npt-9"))
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(err
            .to_string()
            .starts_with("Unable to list node policy targets, got error: "));
    }

    #[tokio::test]
    async fn test_delete_warns_and_keeps_record() {
        let (api, client) = setup();
        let state = NodePolicyTargetResource.create(&client, &production()).await.unwrap();
        let id = state.get("id").as_str().unwrap().to_string();

        let warnings = NodePolicyTargetResource.delete(&client, &state).await.unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(!warnings.has_error());
        assert!(api.node_policy_target(&id).is_some());
    }
}
