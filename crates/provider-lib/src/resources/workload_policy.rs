//! `devzero_workload_policy`: workload recommendation policies
//!
//! A policy decides when recommendations are applied (action and
//! detection triggers) and how workloads are resized, vertically per
//! resource and horizontally by replica count.

use super::{decode_plan, decode_state, encode_state, Resource};
use crate::client::ClientSet;
use crate::convert::{self, merge, narrow, widen_opt};
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::proto::{
    CreateWorkloadRecommendationPolicyRequest, DeleteWorkloadRecommendationPolicyRequest,
    GetWorkloadRecommendationPolicyRequest, HorizontalScalingOptimizationTarget,
    UpdateWorkloadRecommendationPolicyRequest, VerticalScalingOptimizationTarget,
    WorkloadRecommendationPolicy,
};
use crate::schema::validators::{NoNullValues, OneOf, SizeAtLeast, UniqueValues, ValueStringsAre};
use crate::schema::{Attribute, Block, Schema};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

pub const TYPE_NAME: &str = "devzero_workload_policy";

pub const DEFAULT_SCHEDULE: &str = "*/15 * * * *";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadPolicyModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub action_triggers: Option<Vec<String>>,
    pub cron_schedule: Option<String>,
    pub detection_triggers: Option<Vec<String>>,
    pub loopback_period_seconds: Option<i32>,
    pub startup_period_seconds: Option<i32>,

    pub cpu_vertical_scaling: Option<VerticalScalingModel>,
    pub memory_vertical_scaling: Option<VerticalScalingModel>,
    pub gpu_vertical_scaling: Option<VerticalScalingModel>,
    pub gpu_vram_vertical_scaling: Option<VerticalScalingModel>,
    pub horizontal_scaling: Option<HorizontalScalingModel>,

    pub live_migration_enabled: Option<bool>,
    pub scheduler_plugins: Option<Vec<String>>,
    pub defragmentation_schedule: Option<String>,

    pub min_change_percent: Option<f64>,
    pub min_data_points: Option<i32>,
    pub stability_cv_max: Option<f64>,
    pub hysteresis_vs_target: Option<f64>,
    pub drift_delta_percent: Option<f64>,
    pub min_vpa_window_data_points: Option<i32>,
    pub cooldown_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerticalScalingModel {
    pub enabled: Option<bool>,
    pub min_request: Option<i64>,
    pub max_request: Option<i64>,
    pub overhead_multiplier: Option<f64>,
    pub limits_adjustment_enabled: Option<bool>,
    pub target_percentile: Option<f64>,
    pub max_scale_up_percent: Option<f64>,
    pub max_scale_down_percent: Option<f64>,
    pub limit_multiplier: Option<f64>,
    pub min_data_points: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizontalScalingModel {
    pub enabled: Option<bool>,
    pub min_replicas: Option<i32>,
    pub max_replicas: Option<i32>,
    pub target_utilization: Option<f64>,
    pub primary_metric: Option<String>,
    pub min_data_points: Option<i32>,
    pub max_replica_change_percent: Option<f64>,
}

impl VerticalScalingModel {
    fn to_wire(&self) -> VerticalScalingOptimizationTarget {
        VerticalScalingOptimizationTarget {
            enabled: self.enabled.unwrap_or_default(),
            min_request: self.min_request,
            max_request: self.max_request,
            overhead_multiplier: narrow(self.overhead_multiplier),
            limits_adjustment_enabled: self.limits_adjustment_enabled,
            target_percentile: narrow(self.target_percentile),
            max_scale_up_percent: narrow(self.max_scale_up_percent),
            max_scale_down_percent: narrow(self.max_scale_down_percent),
            limit_multiplier: narrow(self.limit_multiplier),
            min_data_points: self.min_data_points,
        }
    }

    fn apply_wire(&mut self, target: &VerticalScalingOptimizationTarget) {
        self.enabled = Some(target.enabled);
        merge(&mut self.min_request, target.min_request);
        merge(&mut self.max_request, target.max_request);
        merge(&mut self.overhead_multiplier, widen_opt(target.overhead_multiplier));
        merge(&mut self.limits_adjustment_enabled, target.limits_adjustment_enabled);
        merge(&mut self.target_percentile, widen_opt(target.target_percentile));
        merge(&mut self.max_scale_up_percent, widen_opt(target.max_scale_up_percent));
        merge(&mut self.max_scale_down_percent, widen_opt(target.max_scale_down_percent));
        merge(&mut self.limit_multiplier, widen_opt(target.limit_multiplier));
        merge(&mut self.min_data_points, target.min_data_points);
    }
}

impl HorizontalScalingModel {
    fn to_wire(&self) -> HorizontalScalingOptimizationTarget {
        HorizontalScalingOptimizationTarget {
            enabled: self.enabled.unwrap_or_default(),
            min_replicas: self.min_replicas,
            max_replicas: self.max_replicas,
            target_utilization: narrow(self.target_utilization),
            primary_metric: self
                .primary_metric
                .as_deref()
                .and_then(convert::hpa_metric_to_wire)
                .map(|m| m as i32),
            min_data_points: self.min_data_points,
            max_replica_change_percent: narrow(self.max_replica_change_percent),
        }
    }

    fn apply_wire(&mut self, target: &HorizontalScalingOptimizationTarget) {
        self.enabled = Some(target.enabled);
        merge(&mut self.min_replicas, target.min_replicas);
        merge(&mut self.max_replicas, target.max_replicas);
        merge(&mut self.target_utilization, widen_opt(target.target_utilization));
        merge(
            &mut self.primary_metric,
            target
                .primary_metric
                .and_then(convert::hpa_metric_from_wire)
                .map(str::to_string),
        );
        merge(&mut self.min_data_points, target.min_data_points);
        merge(
            &mut self.max_replica_change_percent,
            widen_opt(target.max_replica_change_percent),
        );
    }
}

/// Applies a wire scaling block onto an existing model block only. A block
/// absent from configuration stays absent from state.
fn apply_block<M, W>(slot: &mut Option<M>, wire: Option<&W>, apply: impl FnOnce(&mut M, &W)) {
    if let (Some(model), Some(wire)) = (slot.as_mut(), wire) {
        apply(model, wire);
    }
}

impl WorkloadPolicyModel {
    pub fn to_wire(&self, team_id: &str) -> Result<WorkloadRecommendationPolicy> {
        let action_triggers = self
            .action_triggers
            .iter()
            .flatten()
            .map(|t| convert::action_trigger_to_wire(t).map(|t| t as i32))
            .collect::<Result<Vec<_>>>()?;
        let detection_triggers = self
            .detection_triggers
            .iter()
            .flatten()
            .map(|t| convert::detection_trigger_to_wire(t).map(|t| t as i32))
            .collect::<Result<Vec<_>>>()?;

        Ok(WorkloadRecommendationPolicy {
            policy_id: convert::string_to_wire(self.id.as_ref()),
            team_id: team_id.to_string(),
            name: convert::string_to_wire(self.name.as_ref()),
            description: convert::string_to_wire(self.description.as_ref()),
            action_triggers,
            cron_schedule: self.cron_schedule.clone(),
            detection_triggers,
            cpu_vertical_scaling: self.cpu_vertical_scaling.as_ref().map(VerticalScalingModel::to_wire),
            memory_vertical_scaling: self
                .memory_vertical_scaling
                .as_ref()
                .map(VerticalScalingModel::to_wire),
            gpu_vertical_scaling: self.gpu_vertical_scaling.as_ref().map(VerticalScalingModel::to_wire),
            gpu_vram_vertical_scaling: self
                .gpu_vram_vertical_scaling
                .as_ref()
                .map(VerticalScalingModel::to_wire),
            horizontal_scaling: self
                .horizontal_scaling
                .as_ref()
                .map(HorizontalScalingModel::to_wire),
            live_migration_enabled: self.live_migration_enabled.unwrap_or_default(),
            scheduler_plugins: convert::list_to_wire(self.scheduler_plugins.as_ref()),
            defragmentation_schedule: self.defragmentation_schedule.clone(),
            loopback_period_seconds: self.loopback_period_seconds,
            startup_period_seconds: self.startup_period_seconds,
            min_change_percent: narrow(self.min_change_percent),
            min_data_points: self.min_data_points,
            stability_cv_max: narrow(self.stability_cv_max),
            hysteresis_vs_target: narrow(self.hysteresis_vs_target),
            drift_delta_percent: narrow(self.drift_delta_percent),
            min_vpa_window_data_points: self.min_vpa_window_data_points,
            cooldown_minutes: self.cooldown_minutes,
        })
    }

    pub fn apply_wire(&mut self, policy: &WorkloadRecommendationPolicy) {
        self.id = Some(policy.policy_id.clone());
        self.name = Some(policy.name.clone());
        self.description = Some(policy.description.clone());
        self.action_triggers = Some(
            policy
                .action_triggers
                .iter()
                .map(|t| convert::action_trigger_from_wire(*t).to_string())
                .collect(),
        );
        merge(&mut self.cron_schedule, policy.cron_schedule.clone());
        self.detection_triggers = Some(
            policy
                .detection_triggers
                .iter()
                .map(|t| convert::detection_trigger_from_wire(*t).to_string())
                .collect(),
        );
        merge(&mut self.loopback_period_seconds, policy.loopback_period_seconds);
        merge(&mut self.startup_period_seconds, policy.startup_period_seconds);

        for (slot, wire) in [
            (&mut self.cpu_vertical_scaling, &policy.cpu_vertical_scaling),
            (&mut self.memory_vertical_scaling, &policy.memory_vertical_scaling),
            (&mut self.gpu_vertical_scaling, &policy.gpu_vertical_scaling),
            (&mut self.gpu_vram_vertical_scaling, &policy.gpu_vram_vertical_scaling),
        ] {
            apply_block(slot, wire.as_ref(), VerticalScalingModel::apply_wire);
        }
        apply_block(
            &mut self.horizontal_scaling,
            policy.horizontal_scaling.as_ref(),
            HorizontalScalingModel::apply_wire,
        );

        self.live_migration_enabled = Some(policy.live_migration_enabled);
        self.scheduler_plugins = Some(policy.scheduler_plugins.clone());
        merge(
            &mut self.defragmentation_schedule,
            policy.defragmentation_schedule.clone(),
        );

        merge(&mut self.min_change_percent, widen_opt(policy.min_change_percent));
        merge(&mut self.min_data_points, policy.min_data_points);
        merge(&mut self.stability_cv_max, widen_opt(policy.stability_cv_max));
        merge(&mut self.hysteresis_vs_target, widen_opt(policy.hysteresis_vs_target));
        merge(&mut self.drift_delta_percent, widen_opt(policy.drift_delta_percent));
        merge(
            &mut self.min_vpa_window_data_points,
            policy.min_vpa_window_data_points,
        );
        merge(&mut self.cooldown_minutes, policy.cooldown_minutes);
    }
}

fn vertical_scaling(enabled: bool, description: &'static str) -> Attribute {
    let block = Block::new()
        .attribute(
            "enabled",
            Attribute::bool()
                .default(json!(enabled))
                .describe("Enable or disable vertical scaling for this resource"),
        )
        .attribute(
            "min_request",
            Attribute::int64()
                .optional()
                .describe("Lower bound for container resource requests"),
        )
        .attribute(
            "max_request",
            Attribute::int64()
                .optional()
                .describe("Upper bound for container resource requests"),
        )
        .attribute(
            "overhead_multiplier",
            Attribute::float32()
                .default(json!(0.05))
                .describe("Additional headroom added to recommendations"),
        )
        .attribute(
            "limits_adjustment_enabled",
            Attribute::bool()
                .default(json!(false))
                .describe("Allow recommender to adjust container limits as well as requests"),
        )
        .attribute(
            "target_percentile",
            Attribute::float32()
                .optional()
                .describe("Target percentile for resource sizing (0.0-1.0)"),
        )
        .attribute(
            "max_scale_up_percent",
            Attribute::float32()
                .optional()
                .describe("Maximum percent to scale up in one step"),
        )
        .attribute(
            "max_scale_down_percent",
            Attribute::float32()
                .optional()
                .describe("Maximum percent to scale down in one step"),
        )
        .attribute(
            "limit_multiplier",
            Attribute::float32()
                .optional()
                .describe("How much higher limits should be vs requests"),
        )
        .attribute(
            "min_data_points",
            Attribute::int32()
                .optional()
                .describe("Minimum data points required for VPA decisions"),
        );

    Attribute::object(block).optional().describe(description)
}

fn horizontal_scaling() -> Attribute {
    let block = Block::new()
        .attribute(
            "enabled",
            Attribute::bool()
                .default(json!(false))
                .describe("Enable or disable horizontal scaling"),
        )
        .attribute(
            "min_replicas",
            Attribute::int32().optional().describe("Lower bound on replicas"),
        )
        .attribute(
            "max_replicas",
            Attribute::int32().optional().describe("Upper bound on replicas"),
        )
        .attribute(
            "target_utilization",
            Attribute::float32()
                .optional()
                .describe("Target utilization for primary metric (0.0-1.0)"),
        )
        .attribute(
            "primary_metric",
            Attribute::string()
                .optional()
                .describe("Primary metric to use for HPA decisions")
                .validate(OneOf::new(&convert::labels(convert::HPA_METRICS))),
        )
        .attribute(
            "min_data_points",
            Attribute::int32()
                .optional()
                .describe("Minimum data points required for HPA decisions"),
        )
        .attribute(
            "max_replica_change_percent",
            Attribute::float32()
                .optional()
                .describe("Maximum percent replica change in one step"),
        );

    Attribute::object(block)
        .optional()
        .describe("Horizontal scaling options")
}

fn trigger_list(allowed: &[&'static str]) -> Attribute {
    Attribute::string_list()
        .validate(SizeAtLeast(1))
        .validate(NoNullValues)
        .validate(UniqueValues)
        .validate(ValueStringsAre::new(OneOf::new(allowed)))
}

fn optional_float(description: &'static str) -> Attribute {
    Attribute::float32().optional().describe(description)
}

fn optional_int(description: &'static str) -> Attribute {
    Attribute::int32().optional().describe(description)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkloadPolicyResource;

#[async_trait::async_trait]
impl Resource for WorkloadPolicyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Configures DevZero workload recommendation policies, including triggers, scaling targets, and scheduler options.",
            Block::new()
                .attribute(
                    "id",
                    Attribute::string()
                        .computed()
                        .use_state_for_unknown()
                        .describe("Unique identifier of the workload policy"),
                )
                .attribute(
                    "name",
                    Attribute::string()
                        .required()
                        .describe("Human-friendly name for the policy"),
                )
                .attribute(
                    "description",
                    Attribute::string()
                        .default(json!(""))
                        .describe("Free-form description of the policy"),
                )
                .attribute(
                    "action_triggers",
                    trigger_list(&convert::labels(convert::ACTION_TRIGGERS))
                        .required()
                        .describe("When to apply this policy"),
                )
                .attribute(
                    "cron_schedule",
                    Attribute::string()
                        .default(json!(DEFAULT_SCHEDULE))
                        .describe("Cron expression for scheduled application"),
                )
                .attribute(
                    "detection_triggers",
                    trigger_list(&convert::labels(convert::DETECTION_TRIGGERS))
                        .default(json!(["pod_creation", "pod_update"]))
                        .describe("Events that trigger application of this policy"),
                )
                .attribute(
                    "loopback_period_seconds",
                    Attribute::int32()
                        .default(json!(86400))
                        .describe("Window of historical data for recommendations"),
                )
                .attribute(
                    "startup_period_seconds",
                    Attribute::int32()
                        .default(json!(0))
                        .describe("Ignore early-life metrics for this duration"),
                )
                .attribute(
                    "cpu_vertical_scaling",
                    vertical_scaling(true, "CPU vertical scaling options"),
                )
                .attribute(
                    "memory_vertical_scaling",
                    vertical_scaling(true, "Memory vertical scaling options"),
                )
                .attribute(
                    "gpu_vertical_scaling",
                    vertical_scaling(false, "GPU vertical scaling options"),
                )
                .attribute(
                    "gpu_vram_vertical_scaling",
                    vertical_scaling(false, "GPU VRAM vertical scaling options"),
                )
                .attribute("horizontal_scaling", horizontal_scaling())
                .attribute(
                    "live_migration_enabled",
                    Attribute::bool()
                        .default(json!(false))
                        .describe("Allow live migration when applying recommendations"),
                )
                .attribute(
                    "scheduler_plugins",
                    Attribute::string_list()
                        .default(json!(["dz-scheduler"]))
                        .validate(SizeAtLeast(1))
                        .validate(NoNullValues)
                        .validate(UniqueValues)
                        .describe("Kubernetes scheduler plugins to activate"),
                )
                .attribute(
                    "defragmentation_schedule",
                    Attribute::string()
                        .default(json!(DEFAULT_SCHEDULE))
                        .describe("Cron expression for background defragmentation"),
                )
                .attribute(
                    "min_change_percent",
                    optional_float("Global minimum change threshold for applying recommendations"),
                )
                .attribute(
                    "min_data_points",
                    optional_int("Global minimum data points required for recommendations"),
                )
                .attribute(
                    "stability_cv_max",
                    optional_float("Maximum coefficient of variation to consider stable"),
                )
                .attribute(
                    "hysteresis_vs_target",
                    optional_float("Hysteresis threshold vs target for HPA coordination"),
                )
                .attribute(
                    "drift_delta_percent",
                    optional_float("Percentage drift from baseline that triggers VPA refresh"),
                )
                .attribute(
                    "min_vpa_window_data_points",
                    optional_int("Minimum data points in VPA analysis window"),
                )
                .attribute(
                    "cooldown_minutes",
                    optional_int("Minutes to wait between applying recommendations"),
                ),
        )
    }

    async fn create(&self, client: &ClientSet, plan: &Value) -> Result<Value> {
        let mut model: WorkloadPolicyModel = decode_plan(plan)?;
        let policy = model.to_wire(&client.team_id)?;

        let response = client
            .api
            .create_workload_policy(CreateWorkloadRecommendationPolicyRequest {
                team_id: client.team_id.clone(),
                policy: Some(policy),
            })
            .await
            .map_err(|s| ProviderError::client("create workload policy", s))?;

        let policy = response
            .policy
            .ok_or_else(|| ProviderError::EmptyResponse("Workload policy not created".to_string()))?;
        model.apply_wire(&policy);
        trace!(resource = TYPE_NAME, id = %policy.policy_id, "created a workload policy");

        encode_state(&model)
    }

    async fn read(&self, client: &ClientSet, state: &Value) -> Result<Value> {
        let mut model: WorkloadPolicyModel = decode_state(state)?;

        let response = client
            .api
            .get_workload_policy(GetWorkloadRecommendationPolicyRequest {
                team_id: client.team_id.clone(),
                policy_id: model.id.clone().unwrap_or_default(),
            })
            .await
            .map_err(|s| ProviderError::client("get workload policy", s))?;

        let policy = response
            .policy
            .ok_or_else(|| ProviderError::NotFound("Workload policy not found".to_string()))?;
        model.apply_wire(&policy);

        encode_state(&model)
    }

    async fn update(&self, client: &ClientSet, plan: &Value, _prior: &Value) -> Result<Value> {
        let mut model: WorkloadPolicyModel = decode_plan(plan)?;
        let policy = model.to_wire(&client.team_id)?;

        let response = client
            .api
            .update_workload_policy(UpdateWorkloadRecommendationPolicyRequest {
                team_id: client.team_id.clone(),
                policy: Some(policy),
            })
            .await
            .map_err(|s| ProviderError::client("update workload policy", s))?;

        let policy = response
            .policy
            .ok_or_else(|| ProviderError::EmptyResponse("Workload policy not updated".to_string()))?;
        model.apply_wire(&policy);

        encode_state(&model)
    }

    async fn delete(&self, client: &ClientSet, state: &Value) -> Result<Diagnostics> {
        let model: WorkloadPolicyModel = decode_state(state)?;
        debug!(resource = TYPE_NAME, id = ?model.id, "Deleting workload policy");

        client
            .api
            .delete_workload_policy(DeleteWorkloadRecommendationPolicyRequest {
                team_id: client.team_id.clone(),
                policy_id: model.id.unwrap_or_default(),
            })
            .await
            .map_err(|s| ProviderError::client("delete workload policy", s))?;

        Ok(Diagnostics::new())
    }
}
