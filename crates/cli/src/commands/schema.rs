//! Offline commands: resource listing and schema inspection

use anyhow::Result;
use provider_lib::DevzeroProvider;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{format_default, print_json, print_table, OutputFormat};

/// Row for the resources table
#[derive(Tabled, Serialize)]
struct ResourceRow {
    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    type_name: String,
    #[tabled(rename = "Attributes")]
    attributes: usize,
    #[tabled(rename = "Description")]
    description: String,
}

/// Row for the schema table
#[derive(Tabled, Serialize)]
struct AttributeRow {
    #[tabled(rename = "Attribute")]
    path: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    ty: String,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// List registered resource types
pub fn list_resources(provider: &DevzeroProvider, format: OutputFormat) -> Result<()> {
    let rows: Vec<ResourceRow> = provider
        .resources()
        .iter()
        .map(|r| {
            let schema = r.schema();
            ResourceRow {
                type_name: r.type_name().to_string(),
                attributes: schema.block.len(),
                description: schema.description.to_string(),
            }
        })
        .collect();

    print_table(&rows, format);
    Ok(())
}

/// Show the attribute table of one resource type, or of the provider itself
pub fn show_schema(provider: &DevzeroProvider, type_name: &str, format: OutputFormat) -> Result<()> {
    let schema = if type_name == provider.type_name() {
        provider.schema()
    } else {
        provider.resource(type_name)?.schema()
    };

    match format {
        OutputFormat::Json => print_json(&schema.rows()),
        OutputFormat::Table => {
            let rows: Vec<AttributeRow> = schema
                .rows()
                .into_iter()
                .map(|row| AttributeRow {
                    default: format_default(row.default.as_ref()),
                    path: row.path,
                    ty: row.ty,
                    flags: row.flags,
                    description: row.description,
                })
                .collect();
            println!("{}\n", schema.description);
            print_table(&rows, format);
        }
    }
    Ok(())
}
