//! Resource lifecycle commands

use anyhow::Result;
use provider_lib::{driver, DevzeroProvider, PlanAction};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{load_document, load_state, write_document, ProviderArgs};
use crate::output::{
    color_action, print_diagnostics, print_json, print_success, print_warning, OutputFormat,
};

/// Check a configuration document against the resource schema
pub fn validate(provider: &DevzeroProvider, type_name: &str, config: &Path) -> Result<()> {
    let resource = provider.resource(type_name)?;
    let document = load_document(config)?;
    debug!(resource = type_name, config = %config.display(), "Validating configuration");

    driver::validate(resource.as_ref(), &document)?;
    print_success(&format!("{} is a valid {}", config.display(), type_name));
    Ok(())
}

/// Show the change that applying a configuration would make
pub fn plan(
    provider: &DevzeroProvider,
    type_name: &str,
    config: &Path,
    state: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let resource = provider.resource(type_name)?;
    let document = load_document(config)?;
    let prior = load_state(state)?;

    let change = driver::plan(resource.as_ref(), &document, prior.as_ref())?;
    debug!(resource = type_name, action = %change.action, "Planned change");

    match format {
        OutputFormat::Json => print_json(&change.to_display_json()),
        OutputFormat::Table => {
            eprintln!("Plan: {} {}", color_action(change.action), change.resource);
            print_json(&change.planned.to_display_json());
        }
    }
    Ok(())
}

/// Plan and carry out a create or update, then emit the new state
pub async fn apply(
    provider: &DevzeroProvider,
    args: &ProviderArgs,
    type_name: &str,
    config: &Path,
    state: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let resource = provider.resource(type_name)?;
    let document = load_document(config)?;
    let prior = load_state(state)?;

    let driver = args.connect(provider)?;
    let change = driver.plan(resource.as_ref(), &document, prior.as_ref())?;
    info!(resource = type_name, action = %change.action, "Applying configuration");
    let new_state = driver.apply(resource.as_ref(), &change).await?;

    let id = new_state.get("id").as_str().unwrap_or_default().to_string();
    emit_state(&new_state.to_json(), output)?;

    match change.action {
        PlanAction::NoOp => print_success(&format!("{} {} is up to date", type_name, id)),
        action => print_success(&format!("Applied {} of {} {}", action, type_name, id)),
    }
    Ok(())
}

/// Refresh stored state from the fleet API
pub async fn read(
    provider: &DevzeroProvider,
    args: &ProviderArgs,
    type_name: &str,
    state: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let resource = provider.resource(type_name)?;
    let stored = load_document(state)?;

    let driver = args.connect(provider)?;
    info!(resource = type_name, "Refreshing state");
    let refreshed = driver.read(resource.as_ref(), &stored).await?;

    emit_state(&refreshed.to_json(), output)
}

/// Adopt an existing record by id
pub async fn import(
    provider: &DevzeroProvider,
    args: &ProviderArgs,
    type_name: &str,
    id: &str,
    output: Option<&Path>,
) -> Result<()> {
    let resource = provider.resource(type_name)?;

    let driver = args.connect(provider)?;
    info!(resource = type_name, id, "Importing resource");
    let imported = driver.import(resource.as_ref(), id).await?;

    emit_state(&imported.to_json(), output)?;
    print_success(&format!("Imported {} {}", type_name, id));
    Ok(())
}

/// Delete the record behind a state document
pub async fn destroy(
    provider: &DevzeroProvider,
    args: &ProviderArgs,
    type_name: &str,
    state: &Path,
) -> Result<()> {
    let resource = provider.resource(type_name)?;
    let stored = load_document(state)?;
    let id = stored
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let driver = args.connect(provider)?;
    info!(resource = type_name, id = %id, "Destroying resource");
    let warnings = driver.destroy(resource.as_ref(), &stored).await?;

    if warnings.is_empty() {
        print_success(&format!("Destroyed {} {}", type_name, id));
    } else {
        print_diagnostics(&warnings);
        print_warning(&format!("{} {} was not removed from the backend", type_name, id));
    }
    Ok(())
}

fn emit_state(state: &serde_json::Value, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_document(path, state)?;
            print_success(&format!("State written to {}", path.display()));
        }
        None => print_json(state),
    }
    Ok(())
}
