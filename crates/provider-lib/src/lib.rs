//! Provider library for the DevZero fleet API
//!
//! This crate provides the core functionality for:
//! - Declarative schemas for clusters, node policies and workload policies
//! - Conversion between resource models and fleet API messages
//! - Planning and applying resource changes over gRPC
//! - Provider settings from configuration and environment

pub mod client;
pub mod convert;
pub mod diag;
pub mod driver;
pub mod error;
pub mod observability;
pub mod proto;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod value;

pub use diag::{Diagnostic, Diagnostics, Severity};
pub use driver::{Driver, PlanAction, PlannedChange};
pub use error::{ProviderError, Result};
pub use provider::{DevzeroProvider, EnvSettings};
pub use resources::Resource;
pub use value::Value;
