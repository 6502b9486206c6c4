//! Fleet API client abstraction
//!
//! Resources talk to the backend through [`FleetApi`], one method per RPC.
//! [`GrpcFleetApi`] is the tonic implementation; [`MockFleetApi`] keeps
//! records in memory for tests and offline runs.

pub mod grpc;
pub mod mock;

pub use grpc::{BearerAuth, ClientConfig, ClientConfigBuilder, GrpcFleetApi};
pub use mock::MockFleetApi;

use crate::proto::*;
use std::fmt;
use std::sync::Arc;
use tonic::Status;

/// Operations offered by the fleet-management backend.
///
/// All methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait FleetApi: Send + Sync {
    // Clusters
    async fn create_cluster(&self, request: CreateClusterRequest) -> Result<CreateClusterResponse, Status>;
    async fn get_cluster(&self, request: GetClusterRequest) -> Result<GetClusterResponse, Status>;
    async fn update_cluster(&self, request: UpdateClusterRequest) -> Result<UpdateClusterResponse, Status>;
    async fn reset_cluster_token(&self, request: ResetClusterTokenRequest) -> Result<ResetClusterTokenResponse, Status>;
    async fn delete_cluster(&self, request: DeleteClusterRequest) -> Result<DeleteClusterResponse, Status>;

    // Node policies
    async fn create_node_policies(&self, request: CreateNodePoliciesRequest) -> Result<CreateNodePoliciesResponse, Status>;
    async fn list_node_policies(&self, request: ListNodePoliciesRequest) -> Result<ListNodePoliciesResponse, Status>;
    async fn update_node_policy(&self, request: UpdateNodePolicyRequest) -> Result<UpdateNodePolicyResponse, Status>;

    // Node policy targets
    async fn create_node_policy_targets(&self, request: CreateNodePolicyTargetsRequest) -> Result<CreateNodePolicyTargetsResponse, Status>;
    async fn list_node_policy_targets(&self, request: ListNodePolicyTargetsRequest) -> Result<ListNodePolicyTargetsResponse, Status>;
    async fn update_node_policy_target(&self, request: UpdateNodePolicyTargetRequest) -> Result<UpdateNodePolicyTargetResponse, Status>;

    // Workload policies
    async fn create_workload_policy(&self, request: CreateWorkloadRecommendationPolicyRequest) -> Result<CreateWorkloadRecommendationPolicyResponse, Status>;
    async fn get_workload_policy(&self, request: GetWorkloadRecommendationPolicyRequest) -> Result<GetWorkloadRecommendationPolicyResponse, Status>;
    async fn update_workload_policy(&self, request: UpdateWorkloadRecommendationPolicyRequest) -> Result<UpdateWorkloadRecommendationPolicyResponse, Status>;
    async fn delete_workload_policy(&self, request: DeleteWorkloadRecommendationPolicyRequest) -> Result<DeleteWorkloadRecommendationPolicyResponse, Status>;

    // Workload policy targets
    async fn create_workload_policy_target(&self, request: CreateWorkloadPolicyTargetRequest) -> Result<CreateWorkloadPolicyTargetResponse, Status>;
    async fn get_workload_policy_target(&self, request: GetWorkloadPolicyTargetRequest) -> Result<GetWorkloadPolicyTargetResponse, Status>;
    async fn update_workload_policy_target(&self, request: UpdateWorkloadPolicyTargetRequest) -> Result<UpdateWorkloadPolicyTargetResponse, Status>;
    async fn delete_workload_policy_target(&self, request: DeleteWorkloadPolicyTargetRequest) -> Result<DeleteWorkloadPolicyTargetResponse, Status>;
}

/// Team-scoped handle shared by every resource.
#[derive(Clone)]
pub struct ClientSet {
    pub team_id: String,
    pub api: Arc<dyn FleetApi>,
}

impl ClientSet {
    pub fn new(team_id: impl Into<String>, api: Arc<dyn FleetApi>) -> Self {
        Self {
            team_id: team_id.into(),
            api,
        }
    }
}

impl fmt::Debug for ClientSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSet")
            .field("team_id", &self.team_id)
            .finish_non_exhaustive()
    }
}
