//! `devzero_cluster`: a registered Kubernetes cluster and its agent token

use super::{decode_plan, decode_state, encode_state, Resource};
use crate::client::ClientSet;
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::proto::{
    CreateClusterRequest, DeleteClusterRequest, GetClusterRequest, ResetClusterTokenRequest,
    UpdateClusterRequest,
};
use crate::schema::{Attribute, Block, Schema};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub const TYPE_NAME: &str = "devzero_cluster";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub token: Option<String>,
}

impl ClusterModel {
    fn id(&self) -> String {
        self.id.clone().unwrap_or_default()
    }

    fn needs_token(&self) -> bool {
        self.token.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterResource;

impl ClusterResource {
    async fn rotate_token(&self, client: &ClientSet, cluster_id: &str) -> Result<String> {
        debug!(resource = TYPE_NAME, id = %cluster_id, "Rotating cluster token");
        let response = client
            .api
            .reset_cluster_token(ResetClusterTokenRequest {
                team_id: client.team_id.clone(),
                cluster_id: cluster_id.to_string(),
            })
            .await
            .map_err(|s| ProviderError::client("reset cluster token", s))?;

        if response.token.is_empty() {
            return Err(ProviderError::EmptyResponse(
                "Cluster token reset returned empty token".to_string(),
            ));
        }
        Ok(response.token)
    }
}

#[async_trait::async_trait]
impl Resource for ClusterResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Cluster resource",
            Block::new()
                .attribute(
                    "id",
                    Attribute::string()
                        .computed()
                        .use_state_for_unknown()
                        .describe("ID of the cluster"),
                )
                .attribute(
                    "name",
                    Attribute::string().required().describe("Name of the cluster"),
                )
                .attribute(
                    "token",
                    Attribute::string()
                        .computed()
                        .sensitive()
                        .use_state_for_unknown()
                        .describe("Token of the cluster"),
                ),
        )
    }

    /// An empty stored token forces an update, which rotates it.
    fn modify_plan(&self, planned: &mut Value, prior: Option<&Value>) {
        let Some(prior) = prior else {
            return;
        };
        let token = prior.get("token");
        if token.is_null() || token.as_str() == Some("") {
            planned.set("token", Value::Unknown);
        }
    }

    async fn create(&self, client: &ClientSet, plan: &Value) -> Result<Value> {
        let mut model: ClusterModel = decode_plan(plan)?;

        let response = client
            .api
            .create_cluster(CreateClusterRequest {
                team_id: client.team_id.clone(),
                cluster_name: model.name.clone().unwrap_or_default(),
            })
            .await
            .map_err(|s| ProviderError::client("create cluster", s))?;

        let cluster = match response.cluster {
            Some(cluster) if !response.token.is_empty() => cluster,
            _ => return Err(ProviderError::EmptyResponse("Cluster not created".to_string())),
        };

        model.id = Some(cluster.id);
        model.token = Some(response.token);
        trace!(resource = TYPE_NAME, id = ?model.id, "created a resource");

        encode_state(&model)
    }

    async fn read(&self, client: &ClientSet, state: &Value) -> Result<Value> {
        let mut model: ClusterModel = decode_state(state)?;

        let response = client
            .api
            .get_cluster(GetClusterRequest {
                team_id: client.team_id.clone(),
                cluster_id: model.id(),
            })
            .await
            .map_err(|s| ProviderError::client("get cluster", s))?;

        let cluster = response
            .cluster
            .ok_or_else(|| ProviderError::NotFound("Cluster not found".to_string()))?;

        model.name = Some(if cluster.custom_name.is_empty() {
            cluster.name
        } else {
            cluster.custom_name
        });

        encode_state(&model)
    }

    async fn update(&self, client: &ClientSet, plan: &Value, prior: &Value) -> Result<Value> {
        let mut model: ClusterModel = decode_plan(plan)?;
        if model.id.is_none() {
            let prior: ClusterModel = decode_state(prior)?;
            model.id = prior.id;
        }
        let cluster_id = model.id();

        let response = client
            .api
            .update_cluster(UpdateClusterRequest {
                team_id: client.team_id.clone(),
                cluster_id: cluster_id.clone(),
                cluster_name: model.name.clone().unwrap_or_default(),
            })
            .await
            .map_err(|s| ProviderError::client("update cluster", s))?;

        let cluster = response
            .cluster
            .ok_or_else(|| ProviderError::EmptyResponse("Cluster not updated".to_string()))?;
        model.name = Some(cluster.custom_name);

        if model.needs_token() {
            model.token = Some(self.rotate_token(client, &cluster_id).await?);
        }

        encode_state(&model)
    }

    async fn delete(&self, client: &ClientSet, state: &Value) -> Result<Diagnostics> {
        let model: ClusterModel = decode_state(state)?;

        client
            .api
            .delete_cluster(DeleteClusterRequest {
                team_id: client.team_id.clone(),
                cluster_id: model.id(),
            })
            .await
            .map_err(|s| ProviderError::client("delete cluster", s))?;

        Ok(Diagnostics::new())
    }
}
