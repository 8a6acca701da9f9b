//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_SCENE: &str = include_str!("../../../spawnforge.yml.example");

/// Write a sample scene file
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    let scene_path = root.join("spawnforge.yml");
    if scene_path.exists() {
        println!("spawnforge.yml already exists at {:?}", scene_path);
        return Ok(());
    }

    fs::write(&scene_path, DEFAULT_SCENE)
        .with_context(|| format!("Failed to write {:?}", scene_path))?;

    println!("✓ spawnforge initialized in {:?}", root);
    println!("  - Edit spawnforge.yml to define templates, configs and buttons");
    println!("  - Run `spawnforge spawn --button 0` to assemble an actor");
    Ok(())
}
