//! In-memory fleet API
//!
//! Stores records the way the backend does and echoes them back, so full
//! resource lifecycles can run without a server. Failures and empty
//! payloads can be injected per RPC.

use super::FleetApi;
use crate::proto::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tonic::Status;

#[derive(Default)]
struct Store {
    clusters: BTreeMap<String, Cluster>,
    tokens: HashMap<String, String>,
    node_policies: BTreeMap<String, NodePolicy>,
    node_policy_targets: BTreeMap<String, NodePolicyTarget>,
    workload_policies: BTreeMap<String, WorkloadRecommendationPolicy>,
    workload_targets: BTreeMap<String, WorkloadPolicyTarget>,
    failures: HashMap<&'static str, Status>,
    empty: HashSet<&'static str>,
    calls: Vec<&'static str>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Records the call and returns an injected failure, if any.
    fn enter(&mut self, rpc: &'static str) -> Result<bool, Status> {
        self.calls.push(rpc);
        if let Some(status) = self.failures.remove(rpc) {
            return Err(status);
        }
        Ok(self.empty.contains(rpc))
    }
}

/// Mock fleet API for testing
#[derive(Clone, Default)]
pub struct MockFleetApi {
    store: Arc<Mutex<Store>>,
}

impl MockFleetApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The next call of `rpc` fails with `status`.
    pub fn fail_next(&self, rpc: &'static str, status: Status) {
        self.lock().failures.insert(rpc, status);
    }

    /// Calls of `rpc` succeed with an empty payload.
    pub fn respond_empty(&self, rpc: &'static str) {
        self.lock().empty.insert(rpc);
    }

    /// RPC names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, rpc: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == rpc).count()
    }

    pub fn cluster(&self, id: &str) -> Option<Cluster> {
        self.lock().clusters.get(id).cloned()
    }

    pub fn cluster_token(&self, id: &str) -> Option<String> {
        self.lock().tokens.get(id).cloned()
    }

    /// Renames a cluster out of band, as the web console does.
    pub fn set_cluster_custom_name(&self, id: &str, custom_name: &str) {
        if let Some(cluster) = self.lock().clusters.get_mut(id) {
            cluster.custom_name = custom_name.to_string();
        }
    }

    pub fn node_policy(&self, id: &str) -> Option<NodePolicy> {
        self.lock().node_policies.get(id).cloned()
    }

    pub fn node_policy_target(&self, id: &str) -> Option<NodePolicyTarget> {
        self.lock().node_policy_targets.get(id).cloned()
    }

    pub fn workload_policy(&self, id: &str) -> Option<WorkloadRecommendationPolicy> {
        self.lock().workload_policies.get(id).cloned()
    }

    pub fn workload_target(&self, id: &str) -> Option<WorkloadPolicyTarget> {
        self.lock().workload_targets.get(id).cloned()
    }

    /// Inserts a node policy as if created by another client.
    pub fn insert_node_policy(&self, policy: NodePolicy) {
        self.lock().node_policies.insert(policy.id.clone(), policy);
    }
}

#[async_trait::async_trait]
impl FleetApi for MockFleetApi {
    async fn create_cluster(&self, request: CreateClusterRequest) -> Result<CreateClusterResponse, Status> {
        let mut store = self.lock();
        if store.enter("create_cluster")? {
            return Ok(CreateClusterResponse::default());
        }
        let id = store.next_id("cluster");
        let token = store.next_id("dzt");
        let cluster = Cluster {
            id: id.clone(),
            name: request.cluster_name,
            custom_name: String::new(),
            team_id: request.team_id,
        };
        store.clusters.insert(id.clone(), cluster.clone());
        store.tokens.insert(id, token.clone());
        Ok(CreateClusterResponse {
            cluster: Some(cluster),
            token,
        })
    }

    async fn get_cluster(&self, request: GetClusterRequest) -> Result<GetClusterResponse, Status> {
        let mut store = self.lock();
        if store.enter("get_cluster")? {
            return Ok(GetClusterResponse::default());
        }
        Ok(GetClusterResponse {
            cluster: store.clusters.get(&request.cluster_id).cloned(),
        })
    }

    async fn update_cluster(&self, request: UpdateClusterRequest) -> Result<UpdateClusterResponse, Status> {
        let mut store = self.lock();
        if store.enter("update_cluster")? {
            return Ok(UpdateClusterResponse::default());
        }
        let cluster = store.clusters.get_mut(&request.cluster_id).map(|cluster| {
            cluster.custom_name = request.cluster_name;
            cluster.clone()
        });
        Ok(UpdateClusterResponse { cluster })
    }

    async fn reset_cluster_token(&self, request: ResetClusterTokenRequest) -> Result<ResetClusterTokenResponse, Status> {
        let mut store = self.lock();
        if store.enter("reset_cluster_token")? {
            return Ok(ResetClusterTokenResponse::default());
        }
        if !store.clusters.contains_key(&request.cluster_id) {
            return Err(Status::not_found("cluster not found"));
        }
        let token = store.next_id("dzt");
        store.tokens.insert(request.cluster_id, token.clone());
        Ok(ResetClusterTokenResponse { token })
    }

    async fn delete_cluster(&self, request: DeleteClusterRequest) -> Result<DeleteClusterResponse, Status> {
        let mut store = self.lock();
        store.enter("delete_cluster")?;
        store.clusters.remove(&request.cluster_id);
        store.tokens.remove(&request.cluster_id);
        Ok(DeleteClusterResponse {})
    }

    async fn create_node_policies(&self, request: CreateNodePoliciesRequest) -> Result<CreateNodePoliciesResponse, Status> {
        let mut store = self.lock();
        if store.enter("create_node_policies")? {
            return Ok(CreateNodePoliciesResponse::default());
        }
        let mut created = Vec::with_capacity(request.policies.len());
        for mut policy in request.policies {
            policy.id = store.next_id("np");
            policy.team_id = request.team_id.clone();
            store.node_policies.insert(policy.id.clone(), policy.clone());
            created.push(policy);
        }
        Ok(CreateNodePoliciesResponse { policies: created })
    }

    async fn list_node_policies(&self, request: ListNodePoliciesRequest) -> Result<ListNodePoliciesResponse, Status> {
        let mut store = self.lock();
        if store.enter("list_node_policies")? {
            return Ok(ListNodePoliciesResponse::default());
        }
        let policies = store
            .node_policies
            .values()
            .filter(|p| p.team_id == request.team_id)
            .cloned()
            .collect();
        Ok(ListNodePoliciesResponse { policies })
    }

    async fn update_node_policy(&self, request: UpdateNodePolicyRequest) -> Result<UpdateNodePolicyResponse, Status> {
        let mut store = self.lock();
        if store.enter("update_node_policy")? {
            return Ok(UpdateNodePolicyResponse::default());
        }
        let policy = request.policy.and_then(|mut policy| {
            let slot = store.node_policies.get_mut(&policy.id)?;
            policy.team_id = request.team_id;
            *slot = policy.clone();
            Some(policy)
        });
        Ok(UpdateNodePolicyResponse { policy })
    }

    async fn create_node_policy_targets(&self, request: CreateNodePolicyTargetsRequest) -> Result<CreateNodePolicyTargetsResponse, Status> {
        let mut store = self.lock();
        if store.enter("create_node_policy_targets")? {
            return Ok(CreateNodePolicyTargetsResponse::default());
        }
        let mut created = Vec::with_capacity(request.targets.len());
        for mut target in request.targets {
            target.target_id = store.next_id("npt");
            store
                .node_policy_targets
                .insert(target.target_id.clone(), target.clone());
            created.push(target);
        }
        Ok(CreateNodePolicyTargetsResponse { targets: created })
    }

    async fn list_node_policy_targets(&self, request: ListNodePolicyTargetsRequest) -> Result<ListNodePolicyTargetsResponse, Status> {
        let mut store = self.lock();
        if store.enter("list_node_policy_targets")? {
            return Ok(ListNodePolicyTargetsResponse::default());
        }
        let targets = store
            .node_policy_targets
            .values()
            .filter(|t| t.team_id == request.team_id)
            .cloned()
            .collect();
        Ok(ListNodePolicyTargetsResponse { targets })
    }

    async fn update_node_policy_target(&self, request: UpdateNodePolicyTargetRequest) -> Result<UpdateNodePolicyTargetResponse, Status> {
        let mut store = self.lock();
        if store.enter("update_node_policy_target")? {
            return Ok(UpdateNodePolicyTargetResponse::default());
        }
        let target = request.target.and_then(|target| {
            let slot = store.node_policy_targets.get_mut(&target.target_id)?;
            *slot = target.clone();
            Some(target)
        });
        Ok(UpdateNodePolicyTargetResponse { target })
    }

    async fn create_workload_policy(&self, request: CreateWorkloadRecommendationPolicyRequest) -> Result<CreateWorkloadRecommendationPolicyResponse, Status> {
        let mut store = self.lock();
        if store.enter("create_workload_policy")? {
            return Ok(CreateWorkloadRecommendationPolicyResponse::default());
        }
        let Some(mut policy) = request.policy else {
            return Err(Status::invalid_argument("policy is required"));
        };
        policy.policy_id = store.next_id("wp");
        policy.team_id = request.team_id;
        store
            .workload_policies
            .insert(policy.policy_id.clone(), policy.clone());
        Ok(CreateWorkloadRecommendationPolicyResponse {
            policy: Some(policy),
        })
    }

    async fn get_workload_policy(&self, request: GetWorkloadRecommendationPolicyRequest) -> Result<GetWorkloadRecommendationPolicyResponse, Status> {
        let mut store = self.lock();
        if store.enter("get_workload_policy")? {
            return Ok(GetWorkloadRecommendationPolicyResponse::default());
        }
        match store.workload_policies.get(&request.policy_id) {
            Some(policy) => Ok(GetWorkloadRecommendationPolicyResponse {
                policy: Some(policy.clone()),
            }),
            None => Err(Status::not_found("workload policy not found")),
        }
    }

    async fn update_workload_policy(&self, request: UpdateWorkloadRecommendationPolicyRequest) -> Result<UpdateWorkloadRecommendationPolicyResponse, Status> {
        let mut store = self.lock();
        if store.enter("update_workload_policy")? {
            return Ok(UpdateWorkloadRecommendationPolicyResponse::default());
        }
        let Some(mut policy) = request.policy else {
            return Err(Status::invalid_argument("policy is required"));
        };
        let Some(slot) = store.workload_policies.get_mut(&policy.policy_id) else {
            return Err(Status::not_found("workload policy not found"));
        };
        policy.team_id = request.team_id;
        *slot = policy.clone();
        Ok(UpdateWorkloadRecommendationPolicyResponse {
            policy: Some(policy),
        })
    }

    async fn delete_workload_policy(&self, request: DeleteWorkloadRecommendationPolicyRequest) -> Result<DeleteWorkloadRecommendationPolicyResponse, Status> {
        let mut store = self.lock();
        store.enter("delete_workload_policy")?;
        match store.workload_policies.remove(&request.policy_id) {
            Some(_) => Ok(DeleteWorkloadRecommendationPolicyResponse {}),
            None => Err(Status::not_found("workload policy not found")),
        }
    }

    async fn create_workload_policy_target(&self, request: CreateWorkloadPolicyTargetRequest) -> Result<CreateWorkloadPolicyTargetResponse, Status> {
        let mut store = self.lock();
        if store.enter("create_workload_policy_target")? {
            return Ok(CreateWorkloadPolicyTargetResponse::default());
        }
        let target = WorkloadPolicyTarget {
            target_id: store.next_id("wpt"),
            policy_id: request.policy_id,
            team_id: request.team_id,
            name: request.name,
            description: request.description,
            priority: request.priority,
            enabled: request.enabled,
            namespace_selector: request.namespace_selector,
            workload_selector: request.workload_selector,
            kind_filter: request.kind_filter,
            name_pattern: request.name_pattern,
            annotation_selector: request.annotation_selector,
            workload_names: request.workload_names,
            node_group_names: request.node_group_names,
            cluster_ids: request.cluster_ids,
        };
        store
            .workload_targets
            .insert(target.target_id.clone(), target.clone());
        Ok(CreateWorkloadPolicyTargetResponse {
            target: Some(target),
        })
    }

    async fn get_workload_policy_target(&self, request: GetWorkloadPolicyTargetRequest) -> Result<GetWorkloadPolicyTargetResponse, Status> {
        let mut store = self.lock();
        if store.enter("get_workload_policy_target")? {
            return Ok(GetWorkloadPolicyTargetResponse::default());
        }
        match store.workload_targets.get(&request.target_id) {
            Some(target) => Ok(GetWorkloadPolicyTargetResponse {
                target: Some(target.clone()),
            }),
            None => Err(Status::not_found("workload policy target not found")),
        }
    }

    async fn update_workload_policy_target(&self, request: UpdateWorkloadPolicyTargetRequest) -> Result<UpdateWorkloadPolicyTargetResponse, Status> {
        let mut store = self.lock();
        if store.enter("update_workload_policy_target")? {
            return Ok(UpdateWorkloadPolicyTargetResponse::default());
        }
        let Some(target) = store.workload_targets.get_mut(&request.target_id) else {
            return Err(Status::not_found("workload policy target not found"));
        };
        if let Some(policy_id) = request.policy_id {
            target.policy_id = policy_id;
        }
        target.name = request.name;
        target.description = request.description;
        target.priority = request.priority;
        target.enabled = request.enabled;
        target.namespace_selector = request.namespace_selector;
        target.workload_selector = request.workload_selector;
        target.kind_filter = request.kind_filter;
        target.name_pattern = request.name_pattern;
        target.annotation_selector = request.annotation_selector;
        target.workload_names = request.workload_names;
        // An empty list leaves the stored node groups untouched.
        if !request.node_group_names.is_empty() {
            target.node_group_names = request.node_group_names;
        }
        target.cluster_ids = request.cluster_ids;
        Ok(UpdateWorkloadPolicyTargetResponse {
            target: Some(target.clone()),
        })
    }

    async fn delete_workload_policy_target(&self, request: DeleteWorkloadPolicyTargetRequest) -> Result<DeleteWorkloadPolicyTargetResponse, Status> {
        let mut store = self.lock();
        store.enter("delete_workload_policy_target")?;
        for id in &request.target_ids {
            store.workload_targets.remove(id);
        }
        Ok(DeleteWorkloadPolicyTargetResponse {})
    }
}
