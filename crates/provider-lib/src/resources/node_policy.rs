//! `devzero_node_policy`: Karpenter node provisioning preferences
//!
//! The backend has no delete RPC for node policies. Deleting one only
//! drops it from state; the record stays in the backend.

use super::selector::{selector_attribute, LabelSelectorModel};
use super::{decode_plan, decode_state, encode_state, Resource};
use crate::client::ClientSet;
use crate::convert::{self, merge, non_empty, non_empty_list, non_empty_map};
use crate::diag::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::proto::{
    AmiSelectorTerm, AwsNodeClassSpec, AzureNodeClassSpec, BlockDevice, BlockDeviceMapping,
    CreateNodePoliciesRequest, DisruptionBudget, DisruptionPolicy, LabelSelector,
    ListNodePoliciesRequest, MetadataOptions, NodePolicy, RawKarpenterSpec, ResourceLimits,
    SecurityGroupSelectorTerm, SubnetSelectorTerm, Taint, UpdateNodePolicyRequest,
};
use crate::schema::{Attribute, Block, Schema};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{trace, warn};

pub const TYPE_NAME: &str = "devzero_node_policy";

pub const DELETE_WARNING: &str =
    "Node policy delete is a no-op operation. The policy will remain in the backend.";

const SELECTORS: &[(&str, &str)] = &[
    ("instance_categories", "Instance categories selector (e.g., D for Azure, m for AWS)"),
    ("instance_families", "Instance families selector (e.g., c5, m5d, r4)"),
    ("instance_cpus", "Instance CPU count selector (e.g., 4, 8, 16)"),
    ("instance_hypervisors", "Instance hypervisors selector"),
    ("instance_generations", "Instance generations selector (e.g., 4 for Azure, 5 for AWS)"),
    ("instance_sizes", "Instance sizes selector (e.g., Standard_D4s for Azure, large for AWS)"),
    ("zones", "Availability zones selector"),
    ("architectures", "CPU architectures selector (e.g., amd64, arm64)"),
    ("capacity_types", "Capacity types selector (e.g., spot, on-demand, reserved)"),
    ("operating_systems", "Operating systems selector (e.g., linux, windows)"),
];

const TOOLTIPS: &[(&str, &str)] = &[
    ("instance_categories_tip", "Tooltip for instance categories"),
    ("instance_families_tip", "Tooltip for instance families"),
    ("instance_cpus_tip", "Tooltip for instance CPUs"),
    ("instance_hypervisors_tip", "Tooltip for instance hypervisors"),
    ("instance_generations_tip", "Tooltip for instance generations"),
    ("instance_sizes_tip", "Tooltip for instance sizes"),
    ("zones_tip", "Tooltip for zones"),
    ("architectures_tip", "Tooltip for architectures"),
    ("capacity_type_tip", "Tooltip for capacity types"),
    ("operating_systems_tip", "Tooltip for operating systems"),
    ("taints_tip", "Tooltip for taints"),
    ("disruptions_tip", "Tooltip for disruptions"),
    ("limits_tip", "Tooltip for limits"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePolicyModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub weight: Option<i32>,

    pub instance_categories: Option<LabelSelectorModel>,
    pub instance_families: Option<LabelSelectorModel>,
    pub instance_cpus: Option<LabelSelectorModel>,
    pub instance_hypervisors: Option<LabelSelectorModel>,
    pub instance_generations: Option<LabelSelectorModel>,
    pub instance_sizes: Option<LabelSelectorModel>,
    pub zones: Option<LabelSelectorModel>,
    pub architectures: Option<LabelSelectorModel>,
    pub capacity_types: Option<LabelSelectorModel>,
    pub operating_systems: Option<LabelSelectorModel>,

    pub instance_categories_tip: Option<String>,
    pub instance_families_tip: Option<String>,
    pub instance_cpus_tip: Option<String>,
    pub instance_hypervisors_tip: Option<String>,
    pub instance_generations_tip: Option<String>,
    pub instance_sizes_tip: Option<String>,
    pub zones_tip: Option<String>,
    pub architectures_tip: Option<String>,
    pub capacity_type_tip: Option<String>,
    pub operating_systems_tip: Option<String>,

    pub labels: Option<BTreeMap<String, String>>,
    pub taints: Option<Vec<TaintModel>>,
    pub disruption: Option<DisruptionModel>,
    pub limits: Option<LimitsModel>,
    pub taints_tip: Option<String>,
    pub disruptions_tip: Option<String>,
    pub limits_tip: Option<String>,

    pub master_override_role_name: Option<String>,
    pub node_pool_name: Option<String>,
    pub node_class_name: Option<String>,

    pub aws: Option<AwsNodeClassModel>,
    pub azure: Option<AzureNodeClassModel>,
    pub raw: Option<Vec<RawSpecModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaintModel {
    pub key: Option<String>,
    pub value: Option<String>,
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisruptionModel {
    pub consolidate_after: Option<String>,
    pub consolidation_policy: Option<String>,
    pub expire_after: Option<String>,
    pub ttl_seconds_after_empty: Option<i32>,
    pub termination_grace_period_seconds: Option<i32>,
    pub budgets: Option<Vec<BudgetModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetModel {
    pub reasons: Option<Vec<String>>,
    pub nodes: Option<String>,
    pub schedule: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitsModel {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsNodeClassModel {
    pub subnet_selector_terms: Option<Vec<SubnetTermModel>>,
    pub security_group_selector_terms: Option<Vec<SecurityGroupTermModel>>,
    pub ami_selector_terms: Option<Vec<AmiTermModel>>,
    pub ami_family: Option<String>,
    pub user_data: Option<String>,
    pub role: Option<String>,
    pub instance_profile: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
    pub block_device_mappings: Option<Vec<BlockDeviceMappingModel>>,
    pub instance_store_policy: Option<String>,
    pub detailed_monitoring: Option<bool>,
    pub associate_public_ip_address: Option<bool>,
    pub metadata_options: Option<MetadataOptionsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetTermModel {
    pub id: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupTermModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmiTermModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub alias: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDeviceMappingModel {
    pub device_name: Option<String>,
    pub ebs: Option<EbsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EbsModel {
    pub volume_size: Option<String>,
    pub volume_type: Option<String>,
    pub iops: Option<i64>,
    pub throughput: Option<i64>,
    pub kms_key_id: Option<String>,
    pub snapshot_id: Option<String>,
    pub delete_on_termination: Option<bool>,
    pub encrypted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataOptionsModel {
    pub http_endpoint: Option<String>,
    pub http_protocol_ipv6: Option<String>,
    pub http_put_response_hop_limit: Option<i64>,
    pub http_tokens: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureNodeClassModel {
    pub vnet_subnet_id: Option<String>,
    pub os_disk_size_gb: Option<i32>,
    pub image_family: Option<String>,
    pub fips_mode: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
    pub max_pods: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpecModel {
    pub nodepool_yaml: Option<String>,
    pub nodeclass_yaml: Option<String>,
}

fn selector_to_wire(selector: &Option<LabelSelectorModel>) -> Option<LabelSelector> {
    selector.as_ref().map(LabelSelectorModel::to_wire)
}

impl NodePolicyModel {
    pub fn to_wire(&self, team_id: &str) -> NodePolicy {
        NodePolicy {
            id: convert::string_to_wire(self.id.as_ref()),
            name: convert::string_to_wire(self.name.as_ref()),
            description: convert::string_to_wire(self.description.as_ref()),
            team_id: team_id.to_string(),
            weight: self.weight.unwrap_or_default(),

            instance_categories: selector_to_wire(&self.instance_categories),
            instance_families: selector_to_wire(&self.instance_families),
            instance_cpus: selector_to_wire(&self.instance_cpus),
            instance_hypervisors: selector_to_wire(&self.instance_hypervisors),
            instance_generations: selector_to_wire(&self.instance_generations),
            instance_sizes: selector_to_wire(&self.instance_sizes),
            zones: selector_to_wire(&self.zones),
            architectures: selector_to_wire(&self.architectures),
            capacity_types: selector_to_wire(&self.capacity_types),
            operating_systems: selector_to_wire(&self.operating_systems),

            instance_categories_tip: self.instance_categories_tip.clone(),
            instance_families_tip: self.instance_families_tip.clone(),
            instance_cpus_tip: self.instance_cpus_tip.clone(),
            instance_hypervisors_tip: self.instance_hypervisors_tip.clone(),
            instance_generations_tip: self.instance_generations_tip.clone(),
            instance_sizes_tip: self.instance_sizes_tip.clone(),
            zones_tip: self.zones_tip.clone(),
            architectures_tip: self.architectures_tip.clone(),
            capacity_type_tip: self.capacity_type_tip.clone(),
            operating_systems_tip: self.operating_systems_tip.clone(),

            labels: convert::map_to_wire(self.labels.as_ref()),
            taints: self
                .taints
                .iter()
                .flatten()
                .map(|t| Taint {
                    key: convert::string_to_wire(t.key.as_ref()),
                    value: convert::string_to_wire(t.value.as_ref()),
                    effect: convert::string_to_wire(t.effect.as_ref()),
                })
                .collect(),
            disruption: self.disruption.as_ref().map(DisruptionModel::to_wire),
            limits: self.limits.as_ref().map(|l| ResourceLimits {
                cpu: convert::string_to_wire(l.cpu.as_ref()),
                memory: convert::string_to_wire(l.memory.as_ref()),
            }),
            taints_tip: self.taints_tip.clone(),
            disruptions_tip: self.disruptions_tip.clone(),
            limits_tip: self.limits_tip.clone(),

            master_override_role_name: convert::string_to_wire(self.master_override_role_name.as_ref()),
            node_pool_name: convert::string_to_wire(self.node_pool_name.as_ref()),
            node_class_name: convert::string_to_wire(self.node_class_name.as_ref()),

            aws: self.aws.as_ref().map(AwsNodeClassModel::to_wire),
            azure: self.azure.as_ref().map(AzureNodeClassModel::to_wire),
            raw: self
                .raw
                .iter()
                .flatten()
                .map(|r| RawKarpenterSpec {
                    nodepool_yaml: convert::string_to_wire(r.nodepool_yaml.as_ref()),
                    nodeclass_yaml: convert::string_to_wire(r.nodeclass_yaml.as_ref()),
                })
                .collect(),
        }
    }

    /// Overwrites the model with the backend's view of the policy. Absent
    /// selectors, disruption, limits and cloud specs keep the current value.
    pub fn apply_wire(&mut self, policy: &NodePolicy) {
        self.id = Some(policy.id.clone());
        self.name = Some(policy.name.clone());
        self.description = Some(policy.description.clone());
        self.weight = Some(policy.weight);

        for (slot, wire) in [
            (&mut self.instance_categories, &policy.instance_categories),
            (&mut self.instance_families, &policy.instance_families),
            (&mut self.instance_cpus, &policy.instance_cpus),
            (&mut self.instance_hypervisors, &policy.instance_hypervisors),
            (&mut self.instance_generations, &policy.instance_generations),
            (&mut self.instance_sizes, &policy.instance_sizes),
            (&mut self.zones, &policy.zones),
            (&mut self.architectures, &policy.architectures),
            (&mut self.capacity_types, &policy.capacity_types),
            (&mut self.operating_systems, &policy.operating_systems),
        ] {
            let refreshed = wire.as_ref().map(|wire| match slot.as_ref() {
                Some(current) => current.refreshed(wire),
                None => LabelSelectorModel::from_wire(wire),
            });
            merge(slot, refreshed);
        }

        self.instance_categories_tip = policy.instance_categories_tip.clone();
        self.instance_families_tip = policy.instance_families_tip.clone();
        self.instance_cpus_tip = policy.instance_cpus_tip.clone();
        self.instance_hypervisors_tip = policy.instance_hypervisors_tip.clone();
        self.instance_generations_tip = policy.instance_generations_tip.clone();
        self.instance_sizes_tip = policy.instance_sizes_tip.clone();
        self.zones_tip = policy.zones_tip.clone();
        self.architectures_tip = policy.architectures_tip.clone();
        self.capacity_type_tip = policy.capacity_type_tip.clone();
        self.operating_systems_tip = policy.operating_systems_tip.clone();

        self.labels = non_empty_map(&policy.labels);
        self.taints = (!policy.taints.is_empty()).then(|| {
            policy
                .taints
                .iter()
                .map(|t| TaintModel {
                    key: Some(t.key.clone()),
                    value: Some(t.value.clone()),
                    effect: Some(t.effect.clone()),
                })
                .collect()
        });
        merge(&mut self.disruption, policy.disruption.as_ref().map(DisruptionModel::from_wire));
        let limits = policy.limits.as_ref().map(|l| {
            let current = self.limits.as_ref();
            LimitsModel {
                cpu: convert::refresh_string(current.and_then(|m| m.cpu.as_deref()), &l.cpu),
                memory: convert::refresh_string(current.and_then(|m| m.memory.as_deref()), &l.memory),
            }
        });
        merge(&mut self.limits, limits);
        self.taints_tip = policy.taints_tip.clone();
        self.disruptions_tip = policy.disruptions_tip.clone();
        self.limits_tip = policy.limits_tip.clone();

        self.master_override_role_name = Some(policy.master_override_role_name.clone());
        self.node_pool_name = Some(policy.node_pool_name.clone());
        self.node_class_name = Some(policy.node_class_name.clone());

        let aws = policy
            .aws
            .as_ref()
            .filter(|spec| !aws_spec_is_empty(spec))
            .map(|spec| {
                let mut aws = AwsNodeClassModel::from_wire(spec);
                // Every label encodes to RAID0, so the configured spelling stands.
                let configured = self.aws.as_ref().and_then(|a| a.instance_store_policy.as_ref());
                if let (Some(policy), Some(configured)) = (aws.instance_store_policy.as_mut(), configured) {
                    policy.clone_from(configured);
                }
                aws
            });
        merge(&mut self.aws, aws);
        merge(
            &mut self.azure,
            policy
                .azure
                .as_ref()
                .filter(|spec| !azure_spec_is_empty(spec))
                .map(AzureNodeClassModel::from_wire),
        );
        self.raw = (!policy.raw.is_empty()).then(|| {
            policy
                .raw
                .iter()
                .map(|r| RawSpecModel {
                    nodepool_yaml: Some(r.nodepool_yaml.clone()),
                    nodeclass_yaml: Some(r.nodeclass_yaml.clone()),
                })
                .collect()
        });
    }
}

impl DisruptionModel {
    fn to_wire(&self) -> DisruptionPolicy {
        DisruptionPolicy {
            consolidate_after: convert::string_to_wire(self.consolidate_after.as_ref()),
            consolidation_policy: convert::string_to_wire(self.consolidation_policy.as_ref()),
            expire_after: convert::string_to_wire(self.expire_after.as_ref()),
            ttl_seconds_after_empty: self.ttl_seconds_after_empty.unwrap_or_default(),
            termination_grace_period_seconds: self
                .termination_grace_period_seconds
                .unwrap_or_default(),
            budgets: self
                .budgets
                .iter()
                .flatten()
                .map(|b| DisruptionBudget {
                    reasons: convert::list_to_wire(b.reasons.as_ref()),
                    nodes: convert::string_to_wire(b.nodes.as_ref()),
                    schedule: convert::string_to_wire(b.schedule.as_ref()),
                    duration: convert::string_to_wire(b.duration.as_ref()),
                })
                .collect(),
        }
    }

    fn from_wire(disruption: &DisruptionPolicy) -> Self {
        let budgets: Vec<BudgetModel> = disruption
            .budgets
            .iter()
            .map(|b| BudgetModel {
                reasons: non_empty_list(&b.reasons),
                nodes: non_empty(&b.nodes),
                schedule: non_empty(&b.schedule),
                duration: non_empty(&b.duration),
            })
            .collect();

        Self {
            consolidate_after: Some(disruption.consolidate_after.clone()),
            consolidation_policy: Some(disruption.consolidation_policy.clone()),
            expire_after: Some(disruption.expire_after.clone()),
            ttl_seconds_after_empty: Some(disruption.ttl_seconds_after_empty),
            termination_grace_period_seconds: Some(disruption.termination_grace_period_seconds),
            budgets: (!budgets.is_empty()).then_some(budgets),
        }
    }
}

impl AwsNodeClassModel {
    fn to_wire(&self) -> AwsNodeClassSpec {
        AwsNodeClassSpec {
            subnet_selector_terms: self
                .subnet_selector_terms
                .iter()
                .flatten()
                .map(|t| SubnetSelectorTerm {
                    id: convert::string_to_wire(t.id.as_ref()),
                    tags: convert::map_to_wire(t.tags.as_ref()),
                })
                .collect(),
            security_group_selector_terms: self
                .security_group_selector_terms
                .iter()
                .flatten()
                .map(|t| SecurityGroupSelectorTerm {
                    id: convert::string_to_wire(t.id.as_ref()),
                    name: convert::string_to_wire(t.name.as_ref()),
                    tags: convert::map_to_wire(t.tags.as_ref()),
                })
                .collect(),
            ami_selector_terms: self
                .ami_selector_terms
                .iter()
                .flatten()
                .map(|t| AmiSelectorTerm {
                    id: convert::string_to_wire(t.id.as_ref()),
                    name: convert::string_to_wire(t.name.as_ref()),
                    owner: convert::string_to_wire(t.owner.as_ref()),
                    alias: convert::string_to_wire(t.alias.as_ref()),
                    tags: convert::map_to_wire(t.tags.as_ref()),
                })
                .collect(),
            ami_family: self.ami_family.clone(),
            user_data: self.user_data.clone(),
            role: self.role.clone(),
            instance_profile: self.instance_profile.clone(),
            tags: convert::map_to_wire(self.tags.as_ref()),
            block_device_mappings: self
                .block_device_mappings
                .iter()
                .flatten()
                .map(|m| BlockDeviceMapping {
                    device_name: m.device_name.clone(),
                    ebs: m.ebs.as_ref().map(|ebs| BlockDevice {
                        volume_size: ebs.volume_size.clone(),
                        volume_type: ebs.volume_type.clone(),
                        iops: ebs.iops,
                        throughput: ebs.throughput,
                        kms_key_id: ebs.kms_key_id.clone(),
                        snapshot_id: ebs.snapshot_id.clone(),
                        delete_on_termination: ebs.delete_on_termination,
                        encrypted: ebs.encrypted,
                    }),
                })
                .collect(),
            instance_store_policy: self
                .instance_store_policy
                .as_deref()
                .map(|p| convert::instance_store_policy_to_wire(p) as i32),
            detailed_monitoring: self.detailed_monitoring,
            associate_public_ip_address: self.associate_public_ip_address,
            metadata_options: self.metadata_options.as_ref().map(|m| MetadataOptions {
                http_endpoint: m.http_endpoint.clone(),
                http_protocol_ipv6: m.http_protocol_ipv6.clone(),
                http_put_response_hop_limit: m.http_put_response_hop_limit,
                http_tokens: m.http_tokens.clone(),
            }),
        }
    }

    fn from_wire(spec: &AwsNodeClassSpec) -> Self {
        fn terms<W, M>(wire: &[W], f: impl Fn(&W) -> M) -> Option<Vec<M>> {
            (!wire.is_empty()).then(|| wire.iter().map(f).collect())
        }

        Self {
            subnet_selector_terms: terms(&spec.subnet_selector_terms, |t| SubnetTermModel {
                id: non_empty(&t.id),
                tags: non_empty_map(&t.tags),
            }),
            security_group_selector_terms: terms(&spec.security_group_selector_terms, |t| {
                SecurityGroupTermModel {
                    id: non_empty(&t.id),
                    name: non_empty(&t.name),
                    tags: non_empty_map(&t.tags),
                }
            }),
            ami_selector_terms: terms(&spec.ami_selector_terms, |t| AmiTermModel {
                id: non_empty(&t.id),
                name: non_empty(&t.name),
                owner: non_empty(&t.owner),
                alias: non_empty(&t.alias),
                tags: non_empty_map(&t.tags),
            }),
            ami_family: spec.ami_family.clone(),
            user_data: spec.user_data.clone(),
            role: spec.role.clone(),
            instance_profile: spec.instance_profile.clone(),
            tags: non_empty_map(&spec.tags),
            block_device_mappings: terms(&spec.block_device_mappings, |m| BlockDeviceMappingModel {
                device_name: m.device_name.clone(),
                ebs: m.ebs.as_ref().map(|ebs| EbsModel {
                    volume_size: ebs.volume_size.clone(),
                    volume_type: ebs.volume_type.clone(),
                    iops: ebs.iops,
                    throughput: ebs.throughput,
                    kms_key_id: ebs.kms_key_id.clone(),
                    snapshot_id: ebs.snapshot_id.clone(),
                    delete_on_termination: ebs.delete_on_termination,
                    encrypted: ebs.encrypted,
                }),
            }),
            instance_store_policy: spec
                .instance_store_policy
                .and_then(convert::instance_store_policy_from_wire)
                .map(str::to_string),
            detailed_monitoring: spec.detailed_monitoring,
            associate_public_ip_address: spec.associate_public_ip_address,
            metadata_options: spec.metadata_options.as_ref().map(|m| MetadataOptionsModel {
                http_endpoint: m.http_endpoint.clone(),
                http_protocol_ipv6: m.http_protocol_ipv6.clone(),
                http_put_response_hop_limit: m.http_put_response_hop_limit,
                http_tokens: m.http_tokens.clone(),
            }),
        }
    }
}

impl AzureNodeClassModel {
    fn to_wire(&self) -> AzureNodeClassSpec {
        AzureNodeClassSpec {
            vnet_subnet_id: self.vnet_subnet_id.clone(),
            os_disk_size_gb: self.os_disk_size_gb,
            image_family: self.image_family.clone(),
            fips_mode: self.fips_mode.clone(),
            tags: convert::map_to_wire(self.tags.as_ref()),
            max_pods: self.max_pods,
        }
    }

    fn from_wire(spec: &AzureNodeClassSpec) -> Self {
        Self {
            vnet_subnet_id: spec.vnet_subnet_id.clone(),
            os_disk_size_gb: spec.os_disk_size_gb,
            image_family: spec.image_family.clone(),
            fips_mode: spec.fips_mode.clone(),
            tags: non_empty_map(&spec.tags),
            max_pods: spec.max_pods,
        }
    }
}

fn aws_spec_is_empty(spec: &AwsNodeClassSpec) -> bool {
    spec.subnet_selector_terms.is_empty()
        && spec.security_group_selector_terms.is_empty()
        && spec.ami_selector_terms.is_empty()
        && spec.ami_family.is_none()
        && spec.user_data.is_none()
        && spec.role.is_none()
        && spec.instance_profile.is_none()
        && spec.tags.is_empty()
        && spec.block_device_mappings.is_empty()
        && spec.instance_store_policy.is_none()
        && spec.detailed_monitoring.is_none()
        && spec.associate_public_ip_address.is_none()
        && spec.metadata_options.is_none()
}

fn azure_spec_is_empty(spec: &AzureNodeClassSpec) -> bool {
    spec.vnet_subnet_id.is_none()
        && spec.os_disk_size_gb.is_none()
        && spec.image_family.is_none()
        && spec.fips_mode.is_none()
        && spec.tags.is_empty()
        && spec.max_pods.is_none()
}

fn optional_string(description: &'static str) -> Attribute {
    Attribute::string().optional().describe(description)
}

fn disruption_block() -> Block {
    Block::new()
        .attribute(
            "consolidate_after",
            Attribute::string()
                .default(json!("15m"))
                .describe("Duration after which to consolidate nodes"),
        )
        .attribute(
            "consolidation_policy",
            Attribute::string()
                .default(json!("WhenEmptyOrUnderutilized"))
                .describe("Consolidation policy (WhenEmpty, WhenEmptyOrUnderutilized)"),
        )
        .attribute(
            "expire_after",
            Attribute::string()
                .default(json!("720h"))
                .describe("Duration after which nodes expire"),
        )
        .attribute(
            "ttl_seconds_after_empty",
            Attribute::int32()
                .default(json!(0))
                .describe("Seconds to wait before terminating empty nodes"),
        )
        .attribute(
            "termination_grace_period_seconds",
            Attribute::int32()
                .default(json!(0))
                .describe("Grace period for node termination"),
        )
        .attribute(
            "budgets",
            Attribute::object_list(
                Block::new()
                    .attribute(
                        "reasons",
                        Attribute::string_list()
                            .optional()
                            .describe("Reasons for disruption (e.g., Underutilized, Empty)"),
                    )
                    .attribute("nodes", optional_string("Node limit (e.g., '10%' or '2')"))
                    .attribute(
                        "schedule",
                        optional_string("Cron schedule for when this budget applies"),
                    )
                    .attribute("duration", optional_string("Duration for this budget")),
            )
            .optional()
            .describe("Disruption budgets"),
        )
}

fn aws_block() -> Block {
    let tags = || Attribute::string_map().optional();
    let ebs = Block::new()
        .attribute("volume_size", optional_string("Volume size (e.g., '100Gi')"))
        .attribute(
            "volume_type",
            optional_string("Volume type (gp2, gp3, io1, io2, sc1, st1)"),
        )
        .attribute(
            "iops",
            Attribute::int64().optional().describe("IOPS for io1/io2 volumes"),
        )
        .attribute(
            "throughput",
            Attribute::int64()
                .optional()
                .describe("Throughput in MiB/s for gp3 volumes"),
        )
        .attribute("kms_key_id", optional_string("KMS key ID for encryption"))
        .attribute("snapshot_id", optional_string("Snapshot ID to create volume from"))
        .attribute(
            "delete_on_termination",
            Attribute::bool()
                .optional()
                .describe("Delete volume on instance termination"),
        )
        .attribute(
            "encrypted",
            Attribute::bool().optional().describe("Encrypt the volume"),
        );

    let metadata_options = Block::new()
        .attribute(
            "http_endpoint",
            Attribute::string()
                .default(json!("enabled"))
                .describe("Enable or disable the HTTP metadata endpoint"),
        )
        .attribute(
            "http_protocol_ipv6",
            Attribute::string()
                .default(json!("disabled"))
                .describe("Enable or disable IPv6 endpoint"),
        )
        .attribute(
            "http_put_response_hop_limit",
            Attribute::int64()
                .default(json!(2))
                .describe("Desired HTTP PUT response hop limit for instance metadata requests"),
        )
        .attribute(
            "http_tokens",
            Attribute::string()
                .default(json!("required"))
                .describe("Whether or not the metadata service requires session tokens (IMDSv2)"),
        );

    Block::new()
        .attribute(
            "subnet_selector_terms",
            Attribute::object_list(
                Block::new()
                    .attribute("id", optional_string("Subnet ID"))
                    .attribute("tags", tags().describe("Subnet tags selector")),
            )
            .optional()
            .describe("Subnet selector terms"),
        )
        .attribute(
            "security_group_selector_terms",
            Attribute::object_list(
                Block::new()
                    .attribute("id", optional_string("Security group ID"))
                    .attribute("name", optional_string("Security group name"))
                    .attribute("tags", tags().describe("Security group tags selector")),
            )
            .optional()
            .describe("Security group selector terms"),
        )
        .attribute(
            "ami_selector_terms",
            Attribute::object_list(
                Block::new()
                    .attribute("id", optional_string("AMI ID"))
                    .attribute("name", optional_string("AMI name"))
                    .attribute("owner", optional_string("AMI owner"))
                    .attribute("alias", optional_string("AMI alias"))
                    .attribute("tags", tags().describe("AMI tags selector")),
            )
            .optional()
            .describe("AMI selector terms"),
        )
        .attribute(
            "ami_family",
            optional_string("AMI family (e.g., AL2, Bottlerocket, Ubuntu)"),
        )
        .attribute(
            "user_data",
            optional_string("User data script for instance initialization"),
        )
        .attribute("role", optional_string("IAM role name"))
        .attribute("instance_profile", optional_string("IAM instance profile"))
        .attribute("tags", tags().describe("AWS tags to apply to instances"))
        .attribute(
            "block_device_mappings",
            Attribute::object_list(
                Block::new()
                    .attribute("device_name", optional_string("Device name (e.g., /dev/xvda)"))
                    .attribute(
                        "ebs",
                        Attribute::object(ebs)
                            .optional()
                            .describe("EBS volume configuration"),
                    ),
            )
            .optional()
            .describe("Block device mappings"),
        )
        .attribute(
            "instance_store_policy",
            optional_string("Instance store policy (RAID0)"),
        )
        .attribute(
            "detailed_monitoring",
            Attribute::bool()
                .default(json!(false))
                .describe("Enable detailed CloudWatch monitoring"),
        )
        .attribute(
            "associate_public_ip_address",
            Attribute::bool()
                .default(json!(false))
                .describe("Associate public IP address with instances"),
        )
        .attribute(
            "metadata_options",
            Attribute::object(metadata_options)
                .default(json!({
                    "http_endpoint": "enabled",
                    "http_protocol_ipv6": "disabled",
                    "http_put_response_hop_limit": 2,
                    "http_tokens": "required",
                }))
                .describe("EC2 instance metadata service (IMDS) options"),
        )
}

fn azure_block() -> Block {
    Block::new()
        .attribute("vnet_subnet_id", optional_string("VNet subnet ID"))
        .attribute(
            "os_disk_size_gb",
            Attribute::int32().optional().describe("OS disk size in GB"),
        )
        .attribute(
            "image_family",
            optional_string("Image family (Ubuntu, Ubuntu2204, Ubuntu2404, AzureLinux)"),
        )
        .attribute("fips_mode", optional_string("FIPS mode (FIPS, Disabled)"))
        .attribute(
            "tags",
            Attribute::string_map()
                .optional()
                .describe("Azure tags to apply to resources"),
        )
        .attribute(
            "max_pods",
            Attribute::int32()
                .optional()
                .describe("Maximum number of pods per node"),
        )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodePolicyResource;

#[async_trait::async_trait]
impl Resource for NodePolicyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut block = Block::new()
            .attribute(
                "id",
                Attribute::string()
                    .computed()
                    .use_state_for_unknown()
                    .describe("Unique identifier of the node policy"),
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
                "weight",
                Attribute::int32()
                    .default(json!(10))
                    .describe("Priority weight for this node policy"),
            );

        for (name, description) in SELECTORS {
            block = block.attribute(name, selector_attribute(true, description));
        }
        for (name, description) in TOOLTIPS {
            block = block.attribute(name, optional_string(description));
        }

        let block = block
            .attribute(
                "labels",
                Attribute::string_map()
                    .optional()
                    .describe("Kubernetes labels to apply to nodes"),
            )
            .attribute(
                "taints",
                Attribute::object_list(
                    Block::new()
                        .attribute("key", Attribute::string().required().describe("Taint key"))
                        .attribute("value", Attribute::string().required().describe("Taint value"))
                        .attribute(
                            "effect",
                            Attribute::string()
                                .required()
                                .describe("Taint effect (NoSchedule, PreferNoSchedule, NoExecute)"),
                        ),
                )
                .optional()
                .describe("Kubernetes taints to apply to nodes"),
            )
            .attribute(
                "disruption",
                Attribute::object(disruption_block())
                    .optional()
                    .describe("Node disruption policy configuration"),
            )
            .attribute(
                "limits",
                Attribute::object(
                    Block::new()
                        .attribute("cpu", optional_string("Maximum CPU limit"))
                        .attribute("memory", optional_string("Maximum memory limit")),
                )
                .optional()
                .describe("Resource limits for nodes"),
            )
            .attribute(
                "master_override_role_name",
                Attribute::string()
                    .default(json!(""))
                    .describe("Master override role name for Karpenter"),
            )
            .attribute(
                "node_pool_name",
                Attribute::string().default(json!("")).describe("Node pool name"),
            )
            .attribute(
                "node_class_name",
                Attribute::string().default(json!("")).describe("Node class name"),
            )
            .attribute(
                "aws",
                Attribute::object(aws_block())
                    .optional()
                    .describe("AWS-specific node configuration"),
            )
            .attribute(
                "azure",
                Attribute::object(azure_block())
                    .optional()
                    .describe("Azure-specific node configuration"),
            )
            .attribute(
                "raw",
                Attribute::object_list(
                    Block::new()
                        .attribute(
                            "nodepool_yaml",
                            Attribute::string().default(json!("")).describe("Raw NodePool YAML"),
                        )
                        .attribute(
                            "nodeclass_yaml",
                            Attribute::string().default(json!("")).describe("Raw NodeClass YAML"),
                        ),
                )
                .optional()
                .describe("Raw Karpenter YAML specifications"),
            );

        Schema::new(
            "Manages DevZero node policies for Kubernetes cluster node provisioning and optimization using Karpenter.",
            block,
        )
    }

    async fn create(&self, client: &ClientSet, plan: &Value) -> Result<Value> {
        let mut model: NodePolicyModel = decode_plan(plan)?;

        let response = client
            .api
            .create_node_policies(CreateNodePoliciesRequest {
                team_id: client.team_id.clone(),
                policies: vec![model.to_wire(&client.team_id)],
            })
            .await
            .map_err(|s| ProviderError::client("create node policy", s))?;

        let policy = response
            .policies
            .first()
            .ok_or_else(|| ProviderError::EmptyResponse("Node policy not created".to_string()))?;
        model.apply_wire(policy);
        trace!(resource = TYPE_NAME, id = %policy.id, "created a node policy resource");

        encode_state(&model)
    }

    async fn read(&self, client: &ClientSet, state: &Value) -> Result<Value> {
        let mut model: NodePolicyModel = decode_state(state)?;
        let id = model.id.clone().unwrap_or_default();

        let response = client
            .api
            .list_node_policies(ListNodePoliciesRequest {
                team_id: client.team_id.clone(),
            })
            .await
            .map_err(|s| ProviderError::client("list node policies", s))?;

        let policy = response
            .policies
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ProviderError::NotFound("Node policy not found".to_string()))?;
        model.apply_wire(policy);

        encode_state(&model)
    }

    async fn update(&self, client: &ClientSet, plan: &Value, _prior: &Value) -> Result<Value> {
        let mut model: NodePolicyModel = decode_plan(plan)?;

        let response = client
            .api
            .update_node_policy(UpdateNodePolicyRequest {
                team_id: client.team_id.clone(),
                policy: Some(model.to_wire(&client.team_id)),
            })
            .await
            .map_err(|s| ProviderError::client("update node policy", s))?;

        let policy = response
            .policy
            .ok_or_else(|| ProviderError::EmptyResponse("Node policy not updated".to_string()))?;
        model.apply_wire(&policy);

        encode_state(&model)
    }

    async fn delete(&self, _client: &ClientSet, state: &Value) -> Result<Diagnostics> {
        let model: NodePolicyModel = decode_state(state)?;
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
    use crate::proto::InstanceStorePolicy;
    use crate::resources::selector::MatchExpressionModel;
    use std::sync::Arc;

    fn setup() -> (MockFleetApi, ClientSet) {
        let api = MockFleetApi::new();
        let client = ClientSet::new("team-1", Arc::new(api.clone()));
        (api, client)
    }

    fn plan(config: serde_json::Value) -> Value {
        let schema = NodePolicyResource.schema();
        let config = schema.conform(&config).unwrap();
        schema.plan(&config, None)
    }

    #[test]
    fn test_empty_disruption_block_gets_defaults() {
        let planned = plan(json!({ "name": "default", "disruption": {} }));
        let model: NodePolicyModel = planned.decode().unwrap();

        assert_eq!(
            model.disruption,
            Some(DisruptionModel {
                consolidate_after: Some("15m".to_string()),
                consolidation_policy: Some("WhenEmptyOrUnderutilized".to_string()),
                expire_after: Some("720h".to_string()),
                ttl_seconds_after_empty: Some(0),
                termination_grace_period_seconds: Some(0),
                budgets: None,
            })
        );
        assert_eq!(model.weight, Some(10));
        assert_eq!(model.description.as_deref(), Some(""));
    }

    #[test]
    fn test_aws_block_gets_secure_metadata_defaults() {
        let planned = plan(json!({ "name": "aws", "aws": { "role": "KarpenterNodeRole" } }));
        let model: NodePolicyModel = planned.decode().unwrap();
        let aws = model.aws.unwrap();

        assert_eq!(
            aws.metadata_options,
            Some(MetadataOptionsModel {
                http_endpoint: Some("enabled".to_string()),
                http_protocol_ipv6: Some("disabled".to_string()),
                http_put_response_hop_limit: Some(2),
                http_tokens: Some("required".to_string()),
            })
        );
        assert_eq!(aws.detailed_monitoring, Some(false));
    }

    #[test]
    fn test_required_selector_fields() {
        let err = NodePolicyResource
            .schema()
            .conform(&json!({
                "name": "p",
                "zones": { "match_expressions": [{ "values": ["us-east-1a"] }] }
            }))
            .unwrap_err();

        let paths: Vec<_> = err.iter().filter_map(|d| d.attribute.as_deref()).collect();
        assert!(paths.contains(&"zones.match_expressions[0].key"));
        assert!(paths.contains(&"zones.match_expressions[0].operator"));
    }

    #[test]
    fn test_wire_roundtrip_preserves_model() {
        let model = NodePolicyModel {
            id: Some("np-1".to_string()),
            name: Some("gpu".to_string()),
            description: Some("GPU nodes".to_string()),
            weight: Some(50),
            capacity_types: Some(LabelSelectorModel {
                match_labels: None,
                match_expressions: Some(vec![MatchExpressionModel {
                    key: Some("karpenter.sh/capacity-type".to_string()),
                    operator: Some("In".to_string()),
                    values: Some(vec!["spot".to_string(), "on-demand".to_string()]),
                }]),
            }),
            zones_tip: Some("east only".to_string()),
            labels: Some([("pool".to_string(), "gpu".to_string())].into()),
            taints: Some(vec![TaintModel {
                key: Some("nvidia.com/gpu".to_string()),
                value: Some("true".to_string()),
                effect: Some("NoSchedule".to_string()),
            }]),
            disruption: Some(DisruptionModel {
                consolidate_after: Some("5m".to_string()),
                consolidation_policy: Some("WhenEmpty".to_string()),
                expire_after: Some("720h".to_string()),
                ttl_seconds_after_empty: Some(30),
                termination_grace_period_seconds: Some(0),
                budgets: Some(vec![BudgetModel {
                    reasons: Some(vec!["Underutilized".to_string()]),
                    nodes: Some("10%".to_string()),
                    schedule: None,
                    duration: None,
                }]),
            }),
            limits: Some(LimitsModel {
                cpu: Some("1000".to_string()),
                memory: Some("1000Gi".to_string()),
            }),
            master_override_role_name: Some(String::new()),
            node_pool_name: Some("gpu-pool".to_string()),
            node_class_name: Some(String::new()),
            aws: Some(AwsNodeClassModel {
                subnet_selector_terms: Some(vec![SubnetTermModel {
                    id: None,
                    tags: Some([("karpenter.sh/discovery".to_string(), "prod".to_string())].into()),
                }]),
                role: Some("KarpenterNodeRole".to_string()),
                block_device_mappings: Some(vec![BlockDeviceMappingModel {
                    device_name: Some("/dev/xvda".to_string()),
                    ebs: Some(EbsModel {
                        volume_size: Some("100Gi".to_string()),
                        volume_type: Some("gp3".to_string()),
                        iops: Some(3000),
                        encrypted: Some(true),
                        ..Default::default()
                    }),
                }]),
                instance_store_policy: Some("RAID0".to_string()),
                detailed_monitoring: Some(false),
                associate_public_ip_address: Some(false),
                ..Default::default()
            }),
            raw: Some(vec![RawSpecModel {
                nodepool_yaml: Some("kind: NodePool".to_string()),
                nodeclass_yaml: Some(String::new()),
            }]),
            ..Default::default()
        };

        let wire = model.to_wire("team-1");
        let mut decoded = NodePolicyModel::default();
        decoded.apply_wire(&wire);

        assert_eq!(decoded, model);
    }

    #[test]
    fn test_empty_cloud_specs_read_back_as_null() {
        let wire = NodePolicy {
            id: "np-1".to_string(),
            aws: Some(AwsNodeClassSpec::default()),
            azure: Some(AzureNodeClassSpec::default()),
            ..Default::default()
        };

        let mut model = NodePolicyModel::default();
        model.apply_wire(&wire);

        assert!(model.aws.is_none());
        assert!(model.azure.is_none());
        assert!(model.taints.is_none());
        assert!(model.raw.is_none());
        assert!(model.labels.is_none());
    }

    #[test]
    fn test_read_back_keeps_configured_spelling() {
        let model = NodePolicyModel {
            id: Some("np-1".to_string()),
            limits: Some(LimitsModel {
                cpu: Some(String::new()),
                memory: Some("64Gi".to_string()),
            }),
            aws: Some(AwsNodeClassModel {
                role: Some("KarpenterNodeRole".to_string()),
                instance_store_policy: Some("raid0".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let wire = model.to_wire("team-1");
        assert_eq!(wire.aws.as_ref().unwrap().instance_store_policy, Some(InstanceStorePolicy::Raid0 as i32));

        let mut refreshed = model.clone();
        refreshed.apply_wire(&wire);
        assert_eq!(refreshed.limits, model.limits);
        assert_eq!(refreshed.aws.unwrap().instance_store_policy.as_deref(), Some("raid0"));

        let mut imported = NodePolicyModel::default();
        imported.apply_wire(&wire);
        assert_eq!(imported.limits.unwrap().cpu, None);
        assert_eq!(imported.aws.unwrap().instance_store_policy.as_deref(), Some("RAID0"));
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let (api, client) = setup();
        let planned = plan(json!({ "name": "general", "labels": { "team": "infra" } }));

        let state = NodePolicyResource.create(&client, &planned).await.unwrap();
        let id = state.get("id").as_str().unwrap().to_string();
        assert_eq!(api.node_policy(&id).unwrap().labels["team"], "infra");

        let refreshed = NodePolicyResource.read(&client, &state).await.unwrap();
        assert_eq!(refreshed, state);
    }

    #[tokio::test]
    async fn test_create_with_empty_response() {
        let (api, client) = setup();
        api.respond_empty("create_node_policies");

        let err = NodePolicyResource
            .create(&client, &plan(json!({ "name": "general" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Node policy not created");
    }

    #[tokio::test]
    async fn test_read_missing_policy() {
        let (_, client) = setup();
        let err = NodePolicyResource
            .read(&client, &NodePolicyResource.import_state("np-missing"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Node policy not found");
    }

    #[tokio::test]
    async fn test_update_missing_policy() {
        let (_, client) = setup();
        let mut planned = plan(json!({ "name": "general" }));
        planned.set("id", Value::string("np-missing"));

        let err = NodePolicyResource
            .update(&client, &planned, &Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Node policy not updated");
    }

    #[tokio::test]
    async fn test_delete_is_a_noop() {
        let (api, client) = setup();
        let state = NodePolicyResource
            .create(&client, &plan(json!({ "name": "general" })))
            .await
            .unwrap();
        let id = state.get("id").as_str().unwrap().to_string();

        let warnings = NodePolicyResource.delete(&client, &state).await.unwrap();

        assert!(!warnings.has_error());
        assert_eq!(warnings.iter().next().unwrap().detail, DELETE_WARNING);
        assert!(api.node_policy(&id).is_some());
    }
}
