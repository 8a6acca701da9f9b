//! Shared types for spawnforge
//!
//! This crate provides the identifiers and plain data values used across
//! the spawnforge crates: actor instance ids, assembly handles, placements
//! and the animation controller references handed out as visual overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Identifier of an actor instance living in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

impl InstanceId {
    /// Allocate a fresh, process-unique instance id
    pub fn new() -> Self {
        Self(INSTANCE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Handle for one in-flight assembly
///
/// Used to correlate log lines of interleaved assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssemblyId(pub Uuid);

impl AssemblyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssemblyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asm:{}", &self.0.to_string()[..8])
    }
}

/// Where a new instance is placed in the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: [f32; 3],
    /// Rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Placement {
    pub const ORIGIN: Placement = Placement {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            ..Self::ORIGIN
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Reference to an animation controller asset
///
/// Spawn requests may carry one as a visual override; assembly assigns it to
/// the actor's animation driver during finalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationController {
    pub name: String,
    #[serde(default)]
    pub clips: Vec<String>,
}

impl AnimationController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clips: Vec::new(),
        }
    }

    pub fn with_clip(mut self, clip: impl Into<String>) -> Self {
        self.clips.push(clip.into());
        self
    }

    /// Whether this controller knows the given clip
    pub fn has_clip(&self, clip: &str) -> bool {
        self.clips.iter().any(|c| c == clip)
    }
}
