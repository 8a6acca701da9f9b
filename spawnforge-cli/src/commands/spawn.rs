//! Spawn command implementation.

use crate::config::SceneFile;
use anyhow::{bail, Context, Result};
use spawnforge_core::{AssemblyReport, DiagnosticLog};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct SpawnOptions {
    pub button: usize,
    pub count: usize,
    pub json: bool,
    pub max_ticks: usize,
    /// Delay between ticks; zero ticks as fast as possible
    pub tick_ms: u64,
}

/// Click a spawn button and drive the host loop until every assembly is done
pub async fn spawn_actors(config_path: &Path, opts: SpawnOptions) -> Result<()> {
    let scene = SceneFile::from_file(config_path)
        .with_context(|| format!("Failed to load {:?}", config_path))?;

    let log = Arc::new(DiagnosticLog::new());
    let mut host = scene
        .build_host(log.clone())
        .context("Failed to set up the spawner")?;

    for _ in 0..opts.count {
        host.click_button(opts.button)
            .with_context(|| format!("Spawn button {} failed", opts.button))?;
    }

    let mut interval = (opts.tick_ms > 0)
        .then(|| tokio::time::interval(Duration::from_millis(opts.tick_ms)));
    let mut reports = Vec::new();
    let mut ticks = 0;

    while !host.is_idle() {
        if ticks == opts.max_ticks {
            bail!("Assembly did not finish within {} ticks", opts.max_ticks);
        }
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        reports.extend(host.tick().completed);
        ticks += 1;
    }
    tracing::debug!(ticks, assemblies = reports.len(), "host loop idle");

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for diagnostic in log.entries() {
        println!("{diagnostic}");
    }
    for report in &reports {
        println!("{}", summary(report));
    }
    Ok(())
}

fn summary(report: &AssemblyReport) -> String {
    let instance = report
        .instance
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let failed = report.failures().count();
    let mark = if report.is_complete() && failed == 0 {
        "✓"
    } else {
        "!"
    };
    format!(
        "{mark} {} assembled as {instance} ({} behaviors, {} binds, {failed} failed)",
        report.template,
        report.processed.len(),
        report.bindings.len(),
    )
}
