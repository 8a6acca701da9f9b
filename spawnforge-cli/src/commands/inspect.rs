//! Inspect command implementation.

use crate::catalog::BEHAVIORS;
use anyhow::Result;
use serde::Serialize;
use spawnforge_core::CapabilityIndex;

#[derive(Serialize)]
struct BehaviorInfo {
    kind: &'static str,
    behavior: &'static str,
    consumes: Vec<&'static str>,
    expects: Vec<&'static str>,
}

/// Print the capabilities of every built-in behavior kind
pub fn inspect_catalog(json: bool) -> Result<()> {
    let index = CapabilityIndex::new();
    let rows: Vec<BehaviorInfo> = BEHAVIORS
        .iter()
        .map(|(kind, spec)| {
            let unit = spec.create();
            let descriptor = index.capabilities(unit.behavior());
            BehaviorInfo {
                kind: *kind,
                behavior: descriptor.behavior().name(),
                consumes: descriptor.config_types().map(|t| t.name()).collect(),
                expects: descriptor.unbound().iter().map(|t| t.name()).collect(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        let consumes = if row.consumes.is_empty() {
            "-".to_string()
        } else {
            row.consumes.join(", ")
        };
        println!("{:<18} {:<18} consumes: {}", row.kind, row.behavior, consumes);
    }
    Ok(())
}
