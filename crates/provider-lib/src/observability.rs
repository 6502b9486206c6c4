//! Logging setup and structured lifecycle events
//!
//! Logs go to stderr so that stdout stays reserved for state and plan
//! documents.

use std::str::FromStr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Installs the global subscriber. Returns `false` if one was already set.
pub fn init_tracing(format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .is_ok(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .is_ok(),
    }
}

/// Structured logger for resource lifecycle events
///
/// Every event carries the team and resource type so runs against several
/// teams can be told apart in aggregated logs.
#[derive(Debug, Clone)]
pub struct OperationLogger {
    team_id: String,
}

impl OperationLogger {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
        }
    }

    pub fn log_planned(&self, resource: &str, action: &str) {
        info!(
            event = "plan_computed",
            team_id = %self.team_id,
            resource = %resource,
            action = %action,
            "Computed plan"
        );
    }

    pub fn log_applied(&self, resource: &str, action: &str, id: Option<&str>) {
        info!(
            event = "change_applied",
            team_id = %self.team_id,
            resource = %resource,
            action = %action,
            id = ?id,
            "Applied change"
        );
    }

    pub fn log_deleted(&self, resource: &str, id: Option<&str>, warnings: usize) {
        info!(
            event = "resource_deleted",
            team_id = %self.team_id,
            resource = %resource,
            id = ?id,
            warnings = warnings,
            "Deleted resource"
        );
    }

    pub fn log_failed(&self, resource: &str, operation: &str, error: &str) {
        warn!(
            event = "operation_failed",
            team_id = %self.team_id,
            resource = %resource,
            operation = %operation,
            error = %error,
            "Operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_second_init_is_rejected() {
        init_tracing(LogFormat::Text);
        assert!(!init_tracing(LogFormat::Json));
    }

    #[test]
    fn test_logger_without_subscriber() {
        let logger = OperationLogger::new("team-1");
        logger.log_planned("devzero_cluster", "create");
        logger.log_applied("devzero_cluster", "create", Some("cluster-1"));
        logger.log_deleted("devzero_node_policy", None, 1);
        logger.log_failed("devzero_cluster", "read", "Cluster not found");
    }
}
