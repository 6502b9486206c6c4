//! Subcommand implementations

pub mod lifecycle;
pub mod schema;
