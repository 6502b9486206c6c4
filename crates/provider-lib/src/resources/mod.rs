//! Managed resource types
//!
//! Each resource owns its schema, a typed model and the conversions
//! between that model and the wire messages. Lifecycle methods take the
//! planned or stored value, run one RPC (two for a cluster token rotation)
//! and return the new state.

pub mod cluster;
pub mod node_policy;
pub mod node_policy_target;
pub mod selector;
pub mod workload_policy;
pub mod workload_policy_target;

pub use cluster::ClusterResource;
pub use node_policy::NodePolicyResource;
pub use node_policy_target::NodePolicyTargetResource;
pub use workload_policy::WorkloadPolicyResource;
pub use workload_policy_target::WorkloadPolicyTargetResource;

use crate::client::ClientSet;
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::schema::Schema;
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. `devzero_cluster`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Adjusts a computed plan before it is shown or applied. `prior` is
    /// `None` on create.
    fn modify_plan(&self, _planned: &mut Value, _prior: Option<&Value>) {}

    async fn create(&self, client: &ClientSet, plan: &Value) -> Result<Value>;

    async fn read(&self, client: &ClientSet, state: &Value) -> Result<Value>;

    async fn update(&self, client: &ClientSet, plan: &Value, prior: &Value) -> Result<Value>;

    /// Returns warnings raised while deleting.
    async fn delete(&self, client: &ClientSet, state: &Value) -> Result<Diagnostics>;

    /// State written by import before the first read.
    fn import_state(&self, id: &str) -> Value {
        self.schema().import_state(id)
    }
}

/// Every resource type the provider serves.
pub fn all() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(ClusterResource),
        Arc::new(NodePolicyResource),
        Arc::new(NodePolicyTargetResource),
        Arc::new(WorkloadPolicyResource),
        Arc::new(WorkloadPolicyTargetResource),
    ]
}

pub(crate) fn decode_plan<T: DeserializeOwned>(value: &Value) -> Result<T> {
    value.decode().map_err(|e| ProviderError::decode("plan", e))
}

pub(crate) fn decode_state<T: DeserializeOwned>(value: &Value) -> Result<T> {
    value.decode().map_err(|e| ProviderError::decode("state", e))
}

pub(crate) fn encode_state<T: Serialize>(model: &T) -> Result<Value> {
    Value::encode(model).map_err(|e| ProviderError::decode("state", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_names_are_unique_and_prefixed() {
        let resources = all();
        let names: HashSet<_> = resources.iter().map(|r| r.type_name()).collect();

        assert_eq!(names.len(), resources.len());
        assert!(names.iter().all(|n| n.starts_with("devzero_")));
    }

    #[test]
    fn test_every_schema_has_computed_id() {
        for resource in all() {
            let schema = resource.schema();
            let id = schema
                .block
                .get("id")
                .unwrap_or_else(|| panic!("{} has no id", resource.type_name()));
            assert!(id.computed && !id.optional, "{}", resource.type_name());
            assert!(id.use_state_for_unknown);
        }
    }

    #[test]
    fn test_import_state_passes_id_through() {
        for resource in all() {
            let state = resource.import_state("abc-123");
            assert_eq!(state.get("id").as_str(), Some("abc-123"));
        }
    }
}
