//! Plan and apply resource changes against a configured client
//!
//! [`validate`] and [`plan`] work offline from the schema alone. A
//! [`Driver`] holds the client set and carries out planned changes.

use crate::client::ClientSet;
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::observability::OperationLogger;
use crate::resources::Resource;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    Create,
    Update,
    NoOp,
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::NoOp => write!(f, "noop"),
        }
    }
}

/// Result of planning one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub resource: &'static str,
    pub action: PlanAction,
    pub planned: Value,
    pub prior: Option<Value>,
}

impl PlannedChange {
    /// Plan document for display, with unknown values shown as placeholders.
    pub fn to_display_json(&self) -> serde_json::Value {
        serde_json::json!({
            "resource": self.resource,
            "action": self.action,
            "planned": self.planned.to_display_json(),
            "prior": self.prior.as_ref().map(Value::to_json),
        })
    }
}

/// Type-checks a configuration document against the resource schema.
pub fn validate(resource: &dyn Resource, config: &serde_json::Value) -> Result<Value> {
    resource
        .schema()
        .conform(config)
        .map_err(ProviderError::Validation)
}

fn load_prior(resource: &dyn Resource, prior: Option<&serde_json::Value>) -> Result<Option<Value>> {
    match prior {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(state) => resource
            .schema()
            .load_state(state)
            .map(Some)
            .map_err(ProviderError::Validation),
    }
}

/// Computes the change needed to move `prior` state to `config`.
pub fn plan(
    resource: &dyn Resource,
    config: &serde_json::Value,
    prior: Option<&serde_json::Value>,
) -> Result<PlannedChange> {
    let config = validate(resource, config)?;
    let prior = load_prior(resource, prior)?;

    let mut planned = resource.schema().plan(&config, prior.as_ref());
    resource.modify_plan(&mut planned, prior.as_ref());

    let action = match &prior {
        None => PlanAction::Create,
        Some(prior) if &planned != prior => PlanAction::Update,
        Some(_) => PlanAction::NoOp,
    };
    debug!(resource = resource.type_name(), %action, "planned change");

    Ok(PlannedChange {
        resource: resource.type_name(),
        action,
        planned,
        prior,
    })
}

/// Runs resource lifecycle operations for one team.
#[derive(Debug, Clone)]
pub struct Driver {
    client: ClientSet,
    logger: OperationLogger,
}

impl Driver {
    pub fn new(client: ClientSet) -> Self {
        let logger = OperationLogger::new(client.team_id.clone());
        Self { client, logger }
    }

    pub fn client(&self) -> &ClientSet {
        &self.client
    }

    /// Plans and records the plan event.
    pub fn plan(
        &self,
        resource: &dyn Resource,
        config: &serde_json::Value,
        prior: Option<&serde_json::Value>,
    ) -> Result<PlannedChange> {
        let change = plan(resource, config, prior)?;
        self.logger
            .log_planned(change.resource, &change.action.to_string());
        Ok(change)
    }

    /// Applies a planned change and returns the new state.
    pub async fn apply(&self, resource: &dyn Resource, change: &PlannedChange) -> Result<Value> {
        let state = match (change.action, &change.prior) {
            (PlanAction::NoOp, Some(prior)) => return Ok(prior.clone()),
            (PlanAction::Update, Some(prior)) => {
                resource.update(&self.client, &change.planned, prior).await
            }
            _ => resource.create(&self.client, &change.planned).await,
        }
        .map_err(|e| self.failed(resource, &change.action.to_string(), e))?;

        let state = self.normalize(resource, &state)?;
        self.logger.log_applied(
            resource.type_name(),
            &change.action.to_string(),
            state.get("id").as_str(),
        );
        Ok(state)
    }

    /// Refreshes stored state from the remote service.
    pub async fn read(&self, resource: &dyn Resource, state: &serde_json::Value) -> Result<Value> {
        let stored = resource
            .schema()
            .load_state(state)
            .map_err(ProviderError::Validation)?;
        self.refresh(resource, &stored).await
    }

    /// Adopts an existing remote record by id.
    pub async fn import(&self, resource: &dyn Resource, id: &str) -> Result<Value> {
        let stored = resource.import_state(id);
        self.refresh(resource, &stored).await
    }

    /// Deletes the record behind `state` and returns any warnings raised.
    pub async fn destroy(
        &self,
        resource: &dyn Resource,
        state: &serde_json::Value,
    ) -> Result<Diagnostics> {
        let stored = resource
            .schema()
            .load_state(state)
            .map_err(ProviderError::Validation)?;
        let warnings = resource
            .delete(&self.client, &stored)
            .await
            .map_err(|e| self.failed(resource, "delete", e))?;

        self.logger
            .log_deleted(resource.type_name(), stored.get("id").as_str(), warnings.len());
        Ok(warnings)
    }

    async fn refresh(&self, resource: &dyn Resource, stored: &Value) -> Result<Value> {
        let state = resource
            .read(&self.client, stored)
            .await
            .map_err(|e| self.failed(resource, "read", e))?;
        self.normalize(resource, &state)
    }

    fn normalize(&self, resource: &dyn Resource, state: &Value) -> Result<Value> {
        resource
            .schema()
            .load_state(&state.to_json())
            .map_err(ProviderError::Validation)
    }

    fn failed(&self, resource: &dyn Resource, operation: &str, err: ProviderError) -> ProviderError {
        self.logger
            .log_failed(resource.type_name(), operation, &err.to_string());
        err
    }
}
