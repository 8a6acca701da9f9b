//! Interactive console over stdin.

use crate::config::SceneFile;
use anyhow::{Context, Result};
use spawnforge_console::{register_scene_commands, Console, ConsoleLog};
use spawnforge_core::Host;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

const MAX_TICKS_PER_SPAWN: usize = 10_000;

/// Read console commands from stdin until EOF or `quit`
pub fn run_console(config_path: &Path) -> Result<()> {
    let scene = SceneFile::from_file(config_path)
        .with_context(|| format!("Failed to load {:?}", config_path))?;

    let log = Arc::new(ConsoleLog::new());
    let mut host = scene
        .build_host(log.clone())
        .context("Failed to set up the spawner")?;

    let mut console = Console::<Host>::new(log.clone());
    register_scene_commands(&mut console);
    console.register("spawn", "click spawn button <n> and assemble", spawn_command);
    for (alias, original) in &scene.aliases {
        console.register_alias(alias, original);
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }

        if let Err(err) = console.execute(&mut host, &line) {
            tracing::debug!(error = %err, "console command failed");
        }
        for output in log.drain() {
            println!("{output}");
        }
    }
    Ok(())
}

fn spawn_command(host: &mut Host, arg: &str, log: &ConsoleLog) {
    let index = if arg.is_empty() {
        0
    } else {
        match arg.parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                log.send("Usage: spawn <button>");
                return;
            }
        }
    };

    if let Err(err) = host.click_button(index) {
        log.send(format!("Spawn failed: {err}"));
        return;
    }

    for report in host.run_until_idle(MAX_TICKS_PER_SPAWN) {
        let instance = report
            .instance
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        log.send(format!("{} assembled as {instance}", report.template));
    }
}
