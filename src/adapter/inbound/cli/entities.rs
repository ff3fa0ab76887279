//! Handler for the `entities` command.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::EntitiesArgs;
use super::output;
use super::source::Source;
use crate::error::Result;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    device_class: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

/// List recorded entities.
pub fn execute(source: &Source, args: &EntitiesArgs) -> Result<()> {
    let detective = source.detective()?;

    if args.details {
        let pb = output::spinner("Reading entity attributes");
        let described = detective.describe_entities(args.domain.as_deref());
        output::spinner_done(&pb);
        let described = described?;

        if output::is_json() {
            output::json_output(json!({
                "command": "entities",
                "entities": described,
            }));
            return Ok(());
        }

        output::header(env!("CARGO_PKG_VERSION"));
        let rows: Vec<EntityRow> = described
            .into_iter()
            .map(|attrs| EntityRow {
                entity: attrs.entity,
                name: attrs.friendly_name,
                device_class: attrs.device_class,
                unit: attrs.unit_of_measurement,
            })
            .collect();
        output::field("Entities", rows.len());
        if !rows.is_empty() {
            output::lines(&Table::new(rows).to_string());
        }
        return Ok(());
    }

    let pb = output::spinner("Reading entity catalog");
    let catalog = detective.catalog();
    output::spinner_done(&pb);
    let catalog = catalog?;

    let domains: Vec<(&str, &[String])> = match args.domain.as_deref() {
        Some(domain) => vec![(domain, catalog.entities(domain))],
        None => catalog.iter().collect(),
    };

    if output::is_json() {
        let map: serde_json::Map<String, serde_json::Value> = domains
            .iter()
            .map(|(domain, entities)| ((*domain).to_string(), json!(entities)))
            .collect();
        output::json_output(json!({
            "command": "entities",
            "domains": map,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Domains", domains.len());
    output::field(
        "Entities",
        domains.iter().map(|(_, e)| e.len()).sum::<usize>(),
    );
    for (domain, entities) in domains {
        output::section(&format!("{domain} ({})", entities.len()));
        for entity in entities {
            output::note(entity);
        }
    }
    if catalog.is_empty() {
        output::hint("the recorder has no states yet");
    }
    Ok(())
}
