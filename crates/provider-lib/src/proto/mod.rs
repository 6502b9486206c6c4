//! Fleet API protobuf types and gRPC clients
//!
//! With the `proto-gen` feature the code is generated at build time by
//! tonic-build from `proto/api/v1/api.proto`. Otherwise the equivalent
//! message types and clients below are used.

#[cfg(feature = "proto-gen")]
pub mod api {
    pub mod v1 {
        tonic::include_proto!("api.v1");
    }
}

/// Expands to a tonic client for one gRPC service with unary methods only.
#[cfg(not(feature = "proto-gen"))]
macro_rules! service_client {
    (
        $(#[$doc:meta])*
        $module:ident :: $client:ident {
            $( $method:ident ( $req:ident ) -> $resp:ident = $path:literal; )*
        }
    ) => {
        pub mod $module {
            use super::*;
            use tonic::codegen::*;

            $(#[$doc])*
            #[derive(Debug, Clone)]
            pub struct $client<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl $client<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> $client<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub fn with_interceptor<F>(inner: T, interceptor: F) -> $client<InterceptedService<T, F>>
                where
                    F: tonic::service::Interceptor,
                    T::ResponseBody: Default,
                    T: tonic::codegen::Service<
                        http::Request<tonic::body::BoxBody>,
                        Response = http::Response<
                            <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                        >,
                    >,
                    <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error:
                        Into<StdError> + Send + Sync,
                {
                    let inner = InterceptedService::new(inner, interceptor);
                    let inner = tonic::client::Grpc::new(inner);
                    $client { inner }
                }

                $(
                    pub async fn $method(
                        &mut self,
                        request: impl tonic::IntoRequest<$req>,
                    ) -> std::result::Result<tonic::Response<$resp>, tonic::Status> {
                        self.inner.ready().await.map_err(|e| {
                            tonic::Status::new(
                                tonic::Code::Unknown,
                                format!("Service was not ready: {}", e.into()),
                            )
                        })?;
                        let codec = tonic::codec::ProstCodec::default();
                        let path = http::uri::PathAndQuery::from_static($path);
                        self.inner.unary(request.into_request(), path, codec).await
                    }
                )*
            }
        }
    };
}

#[cfg(not(feature = "proto-gen"))]
pub mod api {
    pub mod v1 {
        use prost::Message;
        use std::collections::HashMap;

        // -- clusters ------------------------------------------------------

        #[derive(Clone, PartialEq, Message)]
        pub struct Cluster {
            #[prost(string, tag = "1")]
            pub id: String,
            #[prost(string, tag = "2")]
            pub name: String,
            #[prost(string, tag = "3")]
            pub custom_name: String,
            #[prost(string, tag = "4")]
            pub team_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateClusterRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub cluster_name: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateClusterResponse {
            #[prost(message, optional, tag = "1")]
            pub cluster: Option<Cluster>,
            #[prost(string, tag = "2")]
            pub token: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct GetClusterRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct GetClusterResponse {
            #[prost(message, optional, tag = "1")]
            pub cluster: Option<Cluster>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateClusterRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
            #[prost(string, tag = "3")]
            pub cluster_name: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateClusterResponse {
            #[prost(message, optional, tag = "1")]
            pub cluster: Option<Cluster>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ResetClusterTokenRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ResetClusterTokenResponse {
            #[prost(string, tag = "1")]
            pub token: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DeleteClusterRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub cluster_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DeleteClusterResponse {}

        // -- selectors -----------------------------------------------------

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum LabelSelectorOperator {
            Unspecified = 0,
            In = 1,
            NotIn = 2,
            Exists = 3,
            DoesNotExist = 4,
            Gt = 5,
            Lt = 6,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct LabelSelectorRequirement {
            #[prost(string, tag = "1")]
            pub key: String,
            #[prost(enumeration = "LabelSelectorOperator", tag = "2")]
            pub operator: i32,
            #[prost(string, repeated, tag = "3")]
            pub values: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct LabelSelector {
            #[prost(map = "string, string", tag = "1")]
            pub match_labels: HashMap<String, String>,
            #[prost(message, repeated, tag = "2")]
            pub match_expressions: Vec<LabelSelectorRequirement>,
        }

        // -- node policies -------------------------------------------------

        #[derive(Clone, PartialEq, Message)]
        pub struct Taint {
            #[prost(string, tag = "1")]
            pub key: String,
            #[prost(string, tag = "2")]
            pub value: String,
            #[prost(string, tag = "3")]
            pub effect: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DisruptionBudget {
            #[prost(string, repeated, tag = "1")]
            pub reasons: Vec<String>,
            #[prost(string, tag = "2")]
            pub nodes: String,
            #[prost(string, tag = "3")]
            pub schedule: String,
            #[prost(string, tag = "4")]
            pub duration: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DisruptionPolicy {
            #[prost(string, tag = "1")]
            pub consolidate_after: String,
            #[prost(string, tag = "2")]
            pub consolidation_policy: String,
            #[prost(string, tag = "3")]
            pub expire_after: String,
            #[prost(int32, tag = "4")]
            pub ttl_seconds_after_empty: i32,
            #[prost(int32, tag = "5")]
            pub termination_grace_period_seconds: i32,
            #[prost(message, repeated, tag = "6")]
            pub budgets: Vec<DisruptionBudget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ResourceLimits {
            #[prost(string, tag = "1")]
            pub cpu: String,
            #[prost(string, tag = "2")]
            pub memory: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct SubnetSelectorTerm {
            #[prost(string, tag = "1")]
            pub id: String,
            #[prost(map = "string, string", tag = "2")]
            pub tags: HashMap<String, String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct SecurityGroupSelectorTerm {
            #[prost(string, tag = "1")]
            pub id: String,
            #[prost(string, tag = "2")]
            pub name: String,
            #[prost(map = "string, string", tag = "3")]
            pub tags: HashMap<String, String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AmiSelectorTerm {
            #[prost(string, tag = "1")]
            pub id: String,
            #[prost(string, tag = "2")]
            pub name: String,
            #[prost(string, tag = "3")]
            pub owner: String,
            #[prost(string, tag = "4")]
            pub alias: String,
            #[prost(map = "string, string", tag = "5")]
            pub tags: HashMap<String, String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct BlockDevice {
            #[prost(string, optional, tag = "1")]
            pub volume_size: Option<String>,
            #[prost(string, optional, tag = "2")]
            pub volume_type: Option<String>,
            #[prost(int64, optional, tag = "3")]
            pub iops: Option<i64>,
            #[prost(int64, optional, tag = "4")]
            pub throughput: Option<i64>,
            #[prost(string, optional, tag = "5")]
            pub kms_key_id: Option<String>,
            #[prost(string, optional, tag = "6")]
            pub snapshot_id: Option<String>,
            #[prost(bool, optional, tag = "7")]
            pub delete_on_termination: Option<bool>,
            #[prost(bool, optional, tag = "8")]
            pub encrypted: Option<bool>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct BlockDeviceMapping {
            #[prost(string, optional, tag = "1")]
            pub device_name: Option<String>,
            #[prost(message, optional, tag = "2")]
            pub ebs: Option<BlockDevice>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct MetadataOptions {
            #[prost(string, optional, tag = "1")]
            pub http_endpoint: Option<String>,
            #[prost(string, optional, tag = "2")]
            pub http_protocol_ipv6: Option<String>,
            #[prost(int64, optional, tag = "3")]
            pub http_put_response_hop_limit: Option<i64>,
            #[prost(string, optional, tag = "4")]
            pub http_tokens: Option<String>,
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum InstanceStorePolicy {
            Unspecified = 0,
            Raid0 = 1,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AwsNodeClassSpec {
            #[prost(message, repeated, tag = "1")]
            pub subnet_selector_terms: Vec<SubnetSelectorTerm>,
            #[prost(message, repeated, tag = "2")]
            pub security_group_selector_terms: Vec<SecurityGroupSelectorTerm>,
            #[prost(message, repeated, tag = "3")]
            pub ami_selector_terms: Vec<AmiSelectorTerm>,
            #[prost(string, optional, tag = "4")]
            pub ami_family: Option<String>,
            #[prost(string, optional, tag = "5")]
            pub user_data: Option<String>,
            #[prost(string, optional, tag = "6")]
            pub role: Option<String>,
            #[prost(string, optional, tag = "7")]
            pub instance_profile: Option<String>,
            #[prost(map = "string, string", tag = "8")]
            pub tags: HashMap<String, String>,
            #[prost(message, repeated, tag = "9")]
            pub block_device_mappings: Vec<BlockDeviceMapping>,
            #[prost(enumeration = "InstanceStorePolicy", optional, tag = "10")]
            pub instance_store_policy: Option<i32>,
            #[prost(bool, optional, tag = "11")]
            pub detailed_monitoring: Option<bool>,
            #[prost(bool, optional, tag = "12")]
            pub associate_public_ip_address: Option<bool>,
            #[prost(message, optional, tag = "13")]
            pub metadata_options: Option<MetadataOptions>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AzureNodeClassSpec {
            #[prost(string, optional, tag = "1")]
            pub vnet_subnet_id: Option<String>,
            #[prost(int32, optional, tag = "2")]
            pub os_disk_size_gb: Option<i32>,
            #[prost(string, optional, tag = "3")]
            pub image_family: Option<String>,
            #[prost(string, optional, tag = "4")]
            pub fips_mode: Option<String>,
            #[prost(map = "string, string", tag = "5")]
            pub tags: HashMap<String, String>,
            #[prost(int32, optional, tag = "6")]
            pub max_pods: Option<i32>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct RawKarpenterSpec {
            #[prost(string, tag = "1")]
            pub nodepool_yaml: String,
            #[prost(string, tag = "2")]
            pub nodeclass_yaml: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct NodePolicy {
            #[prost(string, tag = "1")]
            pub id: String,
            #[prost(string, tag = "2")]
            pub name: String,
            #[prost(string, tag = "3")]
            pub description: String,
            #[prost(string, tag = "4")]
            pub team_id: String,
            #[prost(int32, tag = "5")]
            pub weight: i32,
            #[prost(message, optional, tag = "6")]
            pub instance_categories: Option<LabelSelector>,
            #[prost(message, optional, tag = "7")]
            pub instance_families: Option<LabelSelector>,
            #[prost(message, optional, tag = "8")]
            pub instance_cpus: Option<LabelSelector>,
            #[prost(message, optional, tag = "9")]
            pub instance_hypervisors: Option<LabelSelector>,
            #[prost(message, optional, tag = "10")]
            pub instance_generations: Option<LabelSelector>,
            #[prost(message, optional, tag = "11")]
            pub instance_sizes: Option<LabelSelector>,
            #[prost(message, optional, tag = "12")]
            pub zones: Option<LabelSelector>,
            #[prost(message, optional, tag = "13")]
            pub architectures: Option<LabelSelector>,
            #[prost(message, optional, tag = "14")]
            pub capacity_types: Option<LabelSelector>,
            #[prost(message, optional, tag = "15")]
            pub operating_systems: Option<LabelSelector>,
            #[prost(string, optional, tag = "16")]
            pub instance_categories_tip: Option<String>,
            #[prost(string, optional, tag = "17")]
            pub instance_families_tip: Option<String>,
            #[prost(string, optional, tag = "18")]
            pub instance_cpus_tip: Option<String>,
            #[prost(string, optional, tag = "19")]
            pub instance_hypervisors_tip: Option<String>,
            #[prost(string, optional, tag = "20")]
            pub instance_generations_tip: Option<String>,
            #[prost(string, optional, tag = "21")]
            pub instance_sizes_tip: Option<String>,
            #[prost(string, optional, tag = "22")]
            pub zones_tip: Option<String>,
            #[prost(string, optional, tag = "23")]
            pub architectures_tip: Option<String>,
            #[prost(string, optional, tag = "24")]
            pub capacity_type_tip: Option<String>,
            #[prost(string, optional, tag = "25")]
            pub operating_systems_tip: Option<String>,
            #[prost(map = "string, string", tag = "26")]
            pub labels: HashMap<String, String>,
            #[prost(message, repeated, tag = "27")]
            pub taints: Vec<Taint>,
            #[prost(message, optional, tag = "28")]
            pub disruption: Option<DisruptionPolicy>,
            #[prost(message, optional, tag = "29")]
            pub limits: Option<ResourceLimits>,
            #[prost(string, optional, tag = "30")]
            pub taints_tip: Option<String>,
            #[prost(string, optional, tag = "31")]
            pub disruptions_tip: Option<String>,
            #[prost(string, optional, tag = "32")]
            pub limits_tip: Option<String>,
            #[prost(string, tag = "33")]
            pub master_override_role_name: String,
            #[prost(string, tag = "34")]
            pub node_pool_name: String,
            #[prost(string, tag = "35")]
            pub node_class_name: String,
            #[prost(message, optional, tag = "36")]
            pub aws: Option<AwsNodeClassSpec>,
            #[prost(message, optional, tag = "37")]
            pub azure: Option<AzureNodeClassSpec>,
            #[prost(message, repeated, tag = "38")]
            pub raw: Vec<RawKarpenterSpec>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateNodePoliciesRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(message, repeated, tag = "2")]
            pub policies: Vec<NodePolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateNodePoliciesResponse {
            #[prost(message, repeated, tag = "1")]
            pub policies: Vec<NodePolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ListNodePoliciesRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ListNodePoliciesResponse {
            #[prost(message, repeated, tag = "1")]
            pub policies: Vec<NodePolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateNodePolicyRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(message, optional, tag = "2")]
            pub policy: Option<NodePolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateNodePolicyResponse {
            #[prost(message, optional, tag = "1")]
            pub policy: Option<NodePolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct NodePolicyTarget {
            #[prost(string, tag = "1")]
            pub target_id: String,
            #[prost(string, tag = "2")]
            pub name: String,
            #[prost(string, tag = "3")]
            pub description: String,
            #[prost(string, tag = "4")]
            pub team_id: String,
            #[prost(string, repeated, tag = "5")]
            pub cluster_ids: Vec<String>,
            #[prost(string, tag = "6")]
            pub policy_id: String,
            #[prost(bool, tag = "7")]
            pub enabled: bool,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateNodePolicyTargetsRequest {
            #[prost(message, repeated, tag = "1")]
            pub targets: Vec<NodePolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateNodePolicyTargetsResponse {
            #[prost(message, repeated, tag = "1")]
            pub targets: Vec<NodePolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ListNodePolicyTargetsRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ListNodePolicyTargetsResponse {
            #[prost(message, repeated, tag = "1")]
            pub targets: Vec<NodePolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateNodePolicyTargetRequest {
            #[prost(message, optional, tag = "1")]
            pub target: Option<NodePolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateNodePolicyTargetResponse {
            #[prost(message, optional, tag = "1")]
            pub target: Option<NodePolicyTarget>,
        }

        // -- workload policies ---------------------------------------------

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum ActionTrigger {
            Unspecified = 0,
            OnSchedule = 1,
            OnDetection = 2,
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum WorkloadDetectionTrigger {
            DetectionTriggerUnspecified = 0,
            DetectionTriggerPodCreation = 1,
            DetectionTriggerPodUpdate = 2,
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum HpaMetricType {
            Unspecified = 0,
            Cpu = 1,
            Memory = 2,
            Gpu = 3,
            Network = 4,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct VerticalScalingOptimizationTarget {
            #[prost(bool, tag = "1")]
            pub enabled: bool,
            #[prost(int64, optional, tag = "2")]
            pub min_request: Option<i64>,
            #[prost(int64, optional, tag = "3")]
            pub max_request: Option<i64>,
            #[prost(float, optional, tag = "4")]
            pub overhead_multiplier: Option<f32>,
            #[prost(bool, optional, tag = "5")]
            pub limits_adjustment_enabled: Option<bool>,
            #[prost(float, optional, tag = "6")]
            pub target_percentile: Option<f32>,
            #[prost(float, optional, tag = "7")]
            pub max_scale_up_percent: Option<f32>,
            #[prost(float, optional, tag = "8")]
            pub max_scale_down_percent: Option<f32>,
            #[prost(float, optional, tag = "9")]
            pub limit_multiplier: Option<f32>,
            #[prost(int32, optional, tag = "10")]
            pub min_data_points: Option<i32>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct HorizontalScalingOptimizationTarget {
            #[prost(bool, tag = "1")]
            pub enabled: bool,
            #[prost(int32, optional, tag = "2")]
            pub min_replicas: Option<i32>,
            #[prost(int32, optional, tag = "3")]
            pub max_replicas: Option<i32>,
            #[prost(float, optional, tag = "4")]
            pub target_utilization: Option<f32>,
            #[prost(enumeration = "HpaMetricType", optional, tag = "5")]
            pub primary_metric: Option<i32>,
            #[prost(int32, optional, tag = "6")]
            pub min_data_points: Option<i32>,
            #[prost(float, optional, tag = "7")]
            pub max_replica_change_percent: Option<f32>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct WorkloadRecommendationPolicy {
            #[prost(string, tag = "1")]
            pub policy_id: String,
            #[prost(string, tag = "2")]
            pub team_id: String,
            #[prost(string, tag = "3")]
            pub name: String,
            #[prost(string, tag = "4")]
            pub description: String,
            #[prost(enumeration = "ActionTrigger", repeated, tag = "5")]
            pub action_triggers: Vec<i32>,
            #[prost(string, optional, tag = "6")]
            pub cron_schedule: Option<String>,
            #[prost(enumeration = "WorkloadDetectionTrigger", repeated, tag = "7")]
            pub detection_triggers: Vec<i32>,
            #[prost(message, optional, tag = "8")]
            pub cpu_vertical_scaling: Option<VerticalScalingOptimizationTarget>,
            #[prost(message, optional, tag = "9")]
            pub memory_vertical_scaling: Option<VerticalScalingOptimizationTarget>,
            #[prost(message, optional, tag = "10")]
            pub gpu_vertical_scaling: Option<VerticalScalingOptimizationTarget>,
            #[prost(message, optional, tag = "11")]
            pub gpu_vram_vertical_scaling: Option<VerticalScalingOptimizationTarget>,
            #[prost(message, optional, tag = "12")]
            pub horizontal_scaling: Option<HorizontalScalingOptimizationTarget>,
            #[prost(bool, tag = "13")]
            pub live_migration_enabled: bool,
            #[prost(string, repeated, tag = "14")]
            pub scheduler_plugins: Vec<String>,
            #[prost(string, optional, tag = "15")]
            pub defragmentation_schedule: Option<String>,
            #[prost(int32, optional, tag = "16")]
            pub loopback_period_seconds: Option<i32>,
            #[prost(int32, optional, tag = "17")]
            pub startup_period_seconds: Option<i32>,
            #[prost(float, optional, tag = "18")]
            pub min_change_percent: Option<f32>,
            #[prost(int32, optional, tag = "19")]
            pub min_data_points: Option<i32>,
            #[prost(float, optional, tag = "20")]
            pub stability_cv_max: Option<f32>,
            #[prost(float, optional, tag = "21")]
            pub hysteresis_vs_target: Option<f32>,
            #[prost(float, optional, tag = "22")]
            pub drift_delta_percent: Option<f32>,
            #[prost(int32, optional, tag = "23")]
            pub min_vpa_window_data_points: Option<i32>,
            #[prost(int32, optional, tag = "24")]
            pub cooldown_minutes: Option<i32>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateWorkloadRecommendationPolicyRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(message, optional, tag = "2")]
            pub policy: Option<WorkloadRecommendationPolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateWorkloadRecommendationPolicyResponse {
            #[prost(message, optional, tag = "1")]
            pub policy: Option<WorkloadRecommendationPolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct GetWorkloadRecommendationPolicyRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub policy_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct GetWorkloadRecommendationPolicyResponse {
            #[prost(message, optional, tag = "1")]
            pub policy: Option<WorkloadRecommendationPolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateWorkloadRecommendationPolicyRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(message, optional, tag = "2")]
            pub policy: Option<WorkloadRecommendationPolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateWorkloadRecommendationPolicyResponse {
            #[prost(message, optional, tag = "1")]
            pub policy: Option<WorkloadRecommendationPolicy>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DeleteWorkloadRecommendationPolicyRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub policy_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DeleteWorkloadRecommendationPolicyResponse {}

        // -- workload policy targets ---------------------------------------

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum K8sObjectKind {
            Unspecified = 0,
            Pod = 1,
            Job = 2,
            Deployment = 3,
            StatefulSet = 4,
            DaemonSet = 5,
            ReplicaSet = 6,
            CronJob = 7,
            ReplicationController = 8,
            ArgoRollout = 9,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct RegexPattern {
            #[prost(string, tag = "1")]
            pub pattern: String,
            #[prost(string, tag = "2")]
            pub flags: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct WorkloadPolicyTarget {
            #[prost(string, tag = "1")]
            pub target_id: String,
            #[prost(string, tag = "2")]
            pub policy_id: String,
            #[prost(string, tag = "3")]
            pub team_id: String,
            #[prost(string, tag = "4")]
            pub name: String,
            #[prost(string, tag = "5")]
            pub description: String,
            #[prost(int32, tag = "6")]
            pub priority: i32,
            #[prost(bool, tag = "7")]
            pub enabled: bool,
            #[prost(message, optional, tag = "8")]
            pub namespace_selector: Option<LabelSelector>,
            #[prost(message, optional, tag = "9")]
            pub workload_selector: Option<LabelSelector>,
            #[prost(enumeration = "K8sObjectKind", repeated, tag = "10")]
            pub kind_filter: Vec<i32>,
            #[prost(message, optional, tag = "11")]
            pub name_pattern: Option<RegexPattern>,
            #[prost(message, optional, tag = "12")]
            pub annotation_selector: Option<LabelSelector>,
            #[prost(string, repeated, tag = "13")]
            pub workload_names: Vec<String>,
            #[prost(string, repeated, tag = "14")]
            pub node_group_names: Vec<String>,
            #[prost(string, repeated, tag = "15")]
            pub cluster_ids: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateWorkloadPolicyTargetRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub policy_id: String,
            #[prost(string, tag = "3")]
            pub name: String,
            #[prost(string, tag = "4")]
            pub description: String,
            #[prost(int32, tag = "5")]
            pub priority: i32,
            #[prost(bool, tag = "6")]
            pub enabled: bool,
            #[prost(message, optional, tag = "7")]
            pub namespace_selector: Option<LabelSelector>,
            #[prost(message, optional, tag = "8")]
            pub workload_selector: Option<LabelSelector>,
            #[prost(enumeration = "K8sObjectKind", repeated, tag = "9")]
            pub kind_filter: Vec<i32>,
            #[prost(message, optional, tag = "10")]
            pub name_pattern: Option<RegexPattern>,
            #[prost(message, optional, tag = "11")]
            pub annotation_selector: Option<LabelSelector>,
            #[prost(string, repeated, tag = "12")]
            pub workload_names: Vec<String>,
            #[prost(string, repeated, tag = "13")]
            pub node_group_names: Vec<String>,
            #[prost(string, repeated, tag = "14")]
            pub cluster_ids: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct CreateWorkloadPolicyTargetResponse {
            #[prost(message, optional, tag = "1")]
            pub target: Option<WorkloadPolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct GetWorkloadPolicyTargetRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub target_id: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct GetWorkloadPolicyTargetResponse {
            #[prost(message, optional, tag = "1")]
            pub target: Option<WorkloadPolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateWorkloadPolicyTargetRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, tag = "2")]
            pub target_id: String,
            #[prost(string, optional, tag = "3")]
            pub policy_id: Option<String>,
            #[prost(string, tag = "4")]
            pub name: String,
            #[prost(string, tag = "5")]
            pub description: String,
            #[prost(int32, tag = "6")]
            pub priority: i32,
            #[prost(bool, tag = "7")]
            pub enabled: bool,
            #[prost(message, optional, tag = "8")]
            pub namespace_selector: Option<LabelSelector>,
            #[prost(message, optional, tag = "9")]
            pub workload_selector: Option<LabelSelector>,
            #[prost(enumeration = "K8sObjectKind", repeated, tag = "10")]
            pub kind_filter: Vec<i32>,
            #[prost(message, optional, tag = "11")]
            pub name_pattern: Option<RegexPattern>,
            #[prost(message, optional, tag = "12")]
            pub annotation_selector: Option<LabelSelector>,
            #[prost(string, repeated, tag = "13")]
            pub workload_names: Vec<String>,
            #[prost(string, repeated, tag = "14")]
            pub node_group_names: Vec<String>,
            #[prost(string, repeated, tag = "15")]
            pub cluster_ids: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UpdateWorkloadPolicyTargetResponse {
            #[prost(message, optional, tag = "1")]
            pub target: Option<WorkloadPolicyTarget>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DeleteWorkloadPolicyTargetRequest {
            #[prost(string, tag = "1")]
            pub team_id: String,
            #[prost(string, repeated, tag = "2")]
            pub target_ids: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct DeleteWorkloadPolicyTargetResponse {}

        // -- clients -------------------------------------------------------

        service_client! {
            /// Client for cluster registration and token management
            cluster_mutation_service_client::ClusterMutationServiceClient {
                create_cluster(CreateClusterRequest) -> CreateClusterResponse =
                    "/api.v1.ClusterMutationService/CreateCluster";
                update_cluster(UpdateClusterRequest) -> UpdateClusterResponse =
                    "/api.v1.ClusterMutationService/UpdateCluster";
                reset_cluster_token(ResetClusterTokenRequest) -> ResetClusterTokenResponse =
                    "/api.v1.ClusterMutationService/ResetClusterToken";
                delete_cluster(DeleteClusterRequest) -> DeleteClusterResponse =
                    "/api.v1.ClusterMutationService/DeleteCluster";
            }
        }

        service_client! {
            /// Read-only cluster queries
            k8s_service_client::K8sServiceClient {
                get_cluster(GetClusterRequest) -> GetClusterResponse =
                    "/api.v1.K8SService/GetCluster";
            }
        }

        service_client! {
            /// Client for node and workload recommendation policies
            k8s_recommendation_service_client::K8sRecommendationServiceClient {
                create_node_policies(CreateNodePoliciesRequest) -> CreateNodePoliciesResponse =
                    "/api.v1.K8SRecommendationService/CreateNodePolicies";
                list_node_policies(ListNodePoliciesRequest) -> ListNodePoliciesResponse =
                    "/api.v1.K8SRecommendationService/ListNodePolicies";
                update_node_policy(UpdateNodePolicyRequest) -> UpdateNodePolicyResponse =
                    "/api.v1.K8SRecommendationService/UpdateNodePolicy";
                create_node_policy_targets(CreateNodePolicyTargetsRequest) -> CreateNodePolicyTargetsResponse =
                    "/api.v1.K8SRecommendationService/CreateNodePolicyTargets";
                list_node_policy_targets(ListNodePolicyTargetsRequest) -> ListNodePolicyTargetsResponse =
                    "/api.v1.K8SRecommendationService/ListNodePolicyTargets";
                update_node_policy_target(UpdateNodePolicyTargetRequest) -> UpdateNodePolicyTargetResponse =
                    "/api.v1.K8SRecommendationService/UpdateNodePolicyTarget";
                create_workload_recommendation_policy(CreateWorkloadRecommendationPolicyRequest) -> CreateWorkloadRecommendationPolicyResponse =
                    "/api.v1.K8SRecommendationService/CreateWorkloadRecommendationPolicy";
                get_workload_recommendation_policy(GetWorkloadRecommendationPolicyRequest) -> GetWorkloadRecommendationPolicyResponse =
                    "/api.v1.K8SRecommendationService/GetWorkloadRecommendationPolicy";
                update_workload_recommendation_policy(UpdateWorkloadRecommendationPolicyRequest) -> UpdateWorkloadRecommendationPolicyResponse =
                    "/api.v1.K8SRecommendationService/UpdateWorkloadRecommendationPolicy";
                delete_workload_recommendation_policy(DeleteWorkloadRecommendationPolicyRequest) -> DeleteWorkloadRecommendationPolicyResponse =
                    "/api.v1.K8SRecommendationService/DeleteWorkloadRecommendationPolicy";
                create_workload_policy_target(CreateWorkloadPolicyTargetRequest) -> CreateWorkloadPolicyTargetResponse =
                    "/api.v1.K8SRecommendationService/CreateWorkloadPolicyTarget";
                get_workload_policy_target(GetWorkloadPolicyTargetRequest) -> GetWorkloadPolicyTargetResponse =
                    "/api.v1.K8SRecommendationService/GetWorkloadPolicyTarget";
                update_workload_policy_target(UpdateWorkloadPolicyTargetRequest) -> UpdateWorkloadPolicyTargetResponse =
                    "/api.v1.K8SRecommendationService/UpdateWorkloadPolicyTarget";
                delete_workload_policy_target(DeleteWorkloadPolicyTargetRequest) -> DeleteWorkloadPolicyTargetResponse =
                    "/api.v1.K8SRecommendationService/DeleteWorkloadPolicyTarget";
            }
        }
    }
}

pub use api::v1::cluster_mutation_service_client::ClusterMutationServiceClient;
pub use api::v1::k8s_recommendation_service_client::K8sRecommendationServiceClient;
pub use api::v1::k8s_service_client::K8sServiceClient;
pub use api::v1::*;
