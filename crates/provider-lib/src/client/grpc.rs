//! gRPC implementation of [`FleetApi`]
//!
//! The three service clients share one lazily connected channel. Every
//! request carries `authorization: Bearer <token>`, added by
//! [`BearerAuth`]. `https` endpoints use TLS with the platform roots.

use super::FleetApi;
use crate::diag::Diagnostic;
use crate::error::{ProviderError, Result};
use crate::proto::*;
use crate::provider::DEFAULT_URL;
use std::fmt;
use std::time::Duration;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};
use tracing::debug;

/// Configuration for the gRPC client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API endpoint URL (e.g., "https://dakr.devzero.io")
    pub endpoint: String,
    /// Connection timeout. Requests themselves are not time-limited.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Adds the bearer token to every outgoing request.
#[derive(Clone)]
pub struct BearerAuth {
    header: MetadataValue<Ascii>,
}

impl BearerAuth {
    pub fn new(token: &str) -> Result<Self> {
        let header = format!("Bearer {token}").parse().map_err(|_| {
            ProviderError::Configuration(
                Diagnostic::error(
                    "Invalid Devzero API Token",
                    "The Devzero API token contains characters that cannot be sent in a request header.",
                )
                .at("token")
                .into(),
            )
        })?;
        Ok(Self { header })
    }
}

impl Interceptor for BearerAuth {
    fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert("authorization", self.header.clone());
        Ok(request)
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerAuth(<redacted>)")
    }
}

type AuthChannel = InterceptedService<Channel, BearerAuth>;

/// Fleet API over gRPC
#[derive(Clone)]
pub struct GrpcFleetApi {
    endpoint: String,
    clusters: ClusterMutationServiceClient<AuthChannel>,
    k8s: K8sServiceClient<AuthChannel>,
    recommendations: K8sRecommendationServiceClient<AuthChannel>,
}

impl GrpcFleetApi {
    /// Builds the clients. No connection is made until the first call, but
    /// this must run inside a Tokio runtime.
    pub fn connect(config: &ClientConfig, token: &str) -> Result<Self> {
        let invalid = |reason: String| ProviderError::InvalidUrl {
            url: config.endpoint.clone(),
            reason,
        };
        let url = url::Url::parse(&config.endpoint).map_err(|e| invalid(e.to_string()))?;

        let mut endpoint =
            Endpoint::from_shared(config.endpoint.clone())?.connect_timeout(config.connect_timeout);

        match url.scheme() {
            "https" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| invalid("no host in endpoint URL".to_string()))?;
                endpoint = endpoint.tls_config(ClientTlsConfig::new().domain_name(host))?;
            }
            "http" => {}
            other => return Err(invalid(format!("unsupported scheme {other:?}"))),
        }

        let channel = endpoint.connect_lazy();
        let auth = BearerAuth::new(token)?;
        debug!(endpoint = %config.endpoint, "Created Devzero API client");

        Ok(Self {
            endpoint: config.endpoint.clone(),
            clusters: ClusterMutationServiceClient::with_interceptor(channel.clone(), auth.clone()),
            k8s: K8sServiceClient::with_interceptor(channel.clone(), auth.clone()),
            recommendations: K8sRecommendationServiceClient::with_interceptor(channel, auth),
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for GrpcFleetApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcFleetApi")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Calls one unary RPC on a clone of the given client.
macro_rules! unary {
    ($client:expr, $method:ident, $request:expr) => {{
        let mut client = $client.clone();
        debug!(rpc = stringify!($method), "Calling Devzero API");
        client
            .$method($request)
            .await
            .map(tonic::Response::into_inner)
    }};
}

#[async_trait::async_trait]
impl FleetApi for GrpcFleetApi {
    async fn create_cluster(&self, request: CreateClusterRequest) -> std::result::Result<CreateClusterResponse, Status> {
        unary!(self.clusters, create_cluster, request)
    }

    async fn get_cluster(&self, request: GetClusterRequest) -> std::result::Result<GetClusterResponse, Status> {
        unary!(self.k8s, get_cluster, request)
    }

    async fn update_cluster(&self, request: UpdateClusterRequest) -> std::result::Result<UpdateClusterResponse, Status> {
        unary!(self.clusters, update_cluster, request)
    }

    async fn reset_cluster_token(&self, request: ResetClusterTokenRequest) -> std::result::Result<ResetClusterTokenResponse, Status> {
        unary!(self.clusters, reset_cluster_token, request)
    }

    async fn delete_cluster(&self, request: DeleteClusterRequest) -> std::result::Result<DeleteClusterResponse, Status> {
        unary!(self.clusters, delete_cluster, request)
    }

    async fn create_node_policies(&self, request: CreateNodePoliciesRequest) -> std::result::Result<CreateNodePoliciesResponse, Status> {
        unary!(self.recommendations, create_node_policies, request)
    }

    async fn list_node_policies(&self, request: ListNodePoliciesRequest) -> std::result::Result<ListNodePoliciesResponse, Status> {
        unary!(self.recommendations, list_node_policies, request)
    }

    async fn update_node_policy(&self, request: UpdateNodePolicyRequest) -> std::result::Result<UpdateNodePolicyResponse, Status> {
        unary!(self.recommendations, update_node_policy, request)
    }

    async fn create_node_policy_targets(&self, request: CreateNodePolicyTargetsRequest) -> std::result::Result<CreateNodePolicyTargetsResponse, Status> {
        unary!(self.recommendations, create_node_policy_targets, request)
    }

    async fn list_node_policy_targets(&self, request: ListNodePolicyTargetsRequest) -> std::result::Result<ListNodePolicyTargetsResponse, Status> {
        unary!(self.recommendations, list_node_policy_targets, request)
    }

    async fn update_node_policy_target(&self, request: UpdateNodePolicyTargetRequest) -> std::result::Result<UpdateNodePolicyTargetResponse, Status> {
        unary!(self.recommendations, update_node_policy_target, request)
    }

    async fn create_workload_policy(&self, request: CreateWorkloadRecommendationPolicyRequest) -> std::result::Result<CreateWorkloadRecommendationPolicyResponse, Status> {
        unary!(self.recommendations, create_workload_recommendation_policy, request)
    }

    async fn get_workload_policy(&self, request: GetWorkloadRecommendationPolicyRequest) -> std::result::Result<GetWorkloadRecommendationPolicyResponse, Status> {
        unary!(self.recommendations, get_workload_recommendation_policy, request)
    }

    async fn update_workload_policy(&self, request: UpdateWorkloadRecommendationPolicyRequest) -> std::result::Result<UpdateWorkloadRecommendationPolicyResponse, Status> {
        unary!(self.recommendations, update_workload_recommendation_policy, request)
    }

    async fn delete_workload_policy(&self, request: DeleteWorkloadRecommendationPolicyRequest) -> std::result::Result<DeleteWorkloadRecommendationPolicyResponse, Status> {
        unary!(self.recommendations, delete_workload_recommendation_policy, request)
    }

    async fn create_workload_policy_target(&self, request: CreateWorkloadPolicyTargetRequest) -> std::result::Result<CreateWorkloadPolicyTargetResponse, Status> {
        unary!(self.recommendations, create_workload_policy_target, request)
    }

    async fn get_workload_policy_target(&self, request: GetWorkloadPolicyTargetRequest) -> std::result::Result<GetWorkloadPolicyTargetResponse, Status> {
        unary!(self.recommendations, get_workload_policy_target, request)
    }

    async fn update_workload_policy_target(&self, request: UpdateWorkloadPolicyTargetRequest) -> std::result::Result<UpdateWorkloadPolicyTargetResponse, Status> {
        unary!(self.recommendations, update_workload_policy_target, request)
    }

    async fn delete_workload_policy_target(&self, request: DeleteWorkloadPolicyTargetRequest) -> std::result::Result<DeleteWorkloadPolicyTargetResponse, Status> {
        unary!(self.recommendations, delete_workload_policy_target, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = ClientConfig::builder()
            .endpoint("http://localhost:8080")
            .connect_timeout(Duration::from_secs(2))
            .build();

        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(ClientConfig::default().endpoint, DEFAULT_URL);
    }

    #[test]
    fn test_default_config_only_limits_connect() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(
            format!("{config:?}"),
            format!("ClientConfig {{ endpoint: {DEFAULT_URL:?}, connect_timeout: 10s }}")
        );
    }

    #[test]
    fn test_bearer_auth_sets_authorization_header() {
        let mut auth = BearerAuth::new("dz-secret").unwrap();
        let request = auth.call(Request::new(())).unwrap();

        assert_eq!(
            request.metadata().get("authorization").unwrap().to_str().unwrap(),
            "Bearer dz-secret"
        );
        assert!(!format!("{auth:?}").contains("dz-secret"));
    }

    #[test]
    fn test_bearer_auth_rejects_control_characters() {
        let err = BearerAuth::new("bad\ntoken").unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_connect_is_lazy() {
        let config = ClientConfig::builder().endpoint("http://127.0.0.1:1").build();
        let api = GrpcFleetApi::connect(&config, "token").unwrap();
        assert_eq!(api.endpoint(), "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_connect_rejects_unsupported_scheme() {
        let config = ClientConfig::builder().endpoint("ftp://dakr.devzero.io").build();
        let err = GrpcFleetApi::connect(&config, "token").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let config = ClientConfig::builder().endpoint("not a url").build();
        assert!(GrpcFleetApi::connect(&config, "token").is_err());
    }
}
