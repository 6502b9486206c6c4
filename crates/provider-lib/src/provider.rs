//! The `devzero` provider: settings resolution and the resource registry

use crate::client::{ClientConfig, ClientSet, GrpcFleetApi};
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::{ProviderError, Result};
use crate::resources::{self, Resource};
use crate::schema::{Attribute, Block, Schema};
use crate::value::Value;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const TYPE_NAME: &str = "devzero";

/// Endpoint used when neither configuration nor environment set one.
pub const DEFAULT_URL: &str = "https://dakr.devzero.io";

const ENV_PREFIX: &str = "DEVZERO";

/// Provider settings read from `DEVZERO_URL`, `DEVZERO_TEAM_ID` and
/// `DEVZERO_TOKEN`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl EnvSettings {
    /// Load settings from the process environment
    pub fn load() -> Result<Self> {
        Self::from_source(None)
    }

    /// Load settings from an explicit variable map instead of the process
    /// environment.
    pub fn from_source(vars: Option<config::Map<String, String>>) -> Result<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(vars))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                ProviderError::Configuration(
                    Diagnostic::error("Invalid Devzero Environment", e.to_string()).into(),
                )
            })?;
        Ok(settings)
    }
}

/// Resolved settings the client is built from.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub url: String,
    pub team_id: String,
    pub token: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("url", &self.url)
            .field("team_id", &self.team_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn unknown_value(attribute: &str, summary: &str, what: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        summary,
        format!(
            "The provider cannot create the Devzero API client as there is an unknown configuration value for the {what}. \
             Either target apply the source of the value first, set the value statically in the configuration, or use the {env} environment variable."
        ),
    )
    .at(attribute)
}

/// Merges the provider block with environment settings.
///
/// Unknown configured values are rejected first. Environment values are
/// the defaults and any non-null configured value wins. An empty URL falls
/// back to [`DEFAULT_URL`]; an empty team id or token is an error.
pub fn resolve(
    config: &Value,
    env: &EnvSettings,
) -> std::result::Result<ProviderSettings, Diagnostics> {
    let mut diags = Diagnostics::new();

    for (attribute, summary, what, var) in [
        ("url", "Unknown Devzero API URL", "Devzero API URL", "DEVZERO_URL"),
        ("team_id", "Unknown Devzero Team ID", "Devzero Team ID", "DEVZERO_TEAM_ID"),
        ("token", "Unknown Devzero API Token", "Devzero API Token", "DEVZERO_TOKEN"),
    ] {
        if config.get(attribute).is_unknown() {
            diags.push(unknown_value(attribute, summary, what, var));
        }
    }
    diags.clone().into_result()?;

    let pick = |attribute: &str, fallback: &Option<String>| -> String {
        match config.get(attribute).as_str() {
            Some(explicit) => explicit.to_string(),
            None => fallback.clone().unwrap_or_default(),
        }
    };
    let mut url = pick("url", &env.url);
    let team_id = pick("team_id", &env.team_id);
    let token = pick("token", &env.token);

    if url.is_empty() {
        url = DEFAULT_URL.to_string();
    }

    if team_id.is_empty() {
        diags.add_attribute_error(
            "team_id",
            "Missing Devzero Team ID",
            "The provider cannot create the Devzero API client as there is no Devzero Team ID. \
             Either target apply the source of the value first, set the value statically in the configuration, or use the DEVZERO_TEAM_ID environment variable.",
        );
    }

    if token.is_empty() {
        diags.add_attribute_error(
            "token",
            "Missing Devzero API Token",
            "The provider cannot create the Devzero API client as there is no Devzero API Token. \
             Either target apply the source of the value first, set the value statically in the configuration, or use the DEVZERO_TOKEN environment variable. \
             If either is already set, ensure the value is not empty.",
        );
    }

    diags.into_result()?;
    Ok(ProviderSettings {
        url,
        team_id,
        token,
    })
}

/// Provider entry point: owns the resource registry and builds clients.
pub struct DevzeroProvider {
    version: String,
    resources: Vec<Arc<dyn Resource>>,
}

impl DevzeroProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            resources: resources::all(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn schema(&self) -> Schema {
        Schema::new(
            "Manages DevZero clusters, node policies and workload policies.",
            Block::new()
                .attribute("url", Attribute::string().optional().describe("Devzero API URL"))
                .attribute(
                    "team_id",
                    Attribute::string().optional().describe("Devzero Team ID"),
                )
                .attribute(
                    "token",
                    Attribute::string()
                        .optional()
                        .sensitive()
                        .describe("The token used to authenticate with the Devzero API"),
                ),
        )
    }

    pub fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }

    /// Looks up a resource by full type name, e.g. `devzero_cluster`.
    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .iter()
            .find(|r| r.type_name() == type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Resolves settings and builds the gRPC client set. Must run inside a
    /// Tokio runtime.
    pub fn configure(&self, config: &Value, env: &EnvSettings) -> Result<ClientSet> {
        let settings = resolve(config, env).map_err(ProviderError::Configuration)?;
        debug!(url = %settings.url, team_id = %settings.team_id, "Configuring Devzero provider");

        let client_config = ClientConfig::builder().endpoint(settings.url.clone()).build();
        let api = GrpcFleetApi::connect(&client_config, &settings.token)?;
        info!(team_id = %settings.team_id, version = %self.version, "Devzero provider configured");

        Ok(ClientSet::new(settings.team_id, Arc::new(api)))
    }
}

impl std::fmt::Debug for DevzeroProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevzeroProvider")
            .field("version", &self.version)
            .field("resources", &self.resources.len())
            .finish()
    }
}
