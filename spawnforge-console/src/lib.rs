//! Spawnforge command console
//!
//! A small string-routing utility for hosts: commands are registered by
//! name, shorthand aliases map onto them, and everything the console says
//! lands in a [`ConsoleLog`]. The log is also a
//! [`DiagnosticsSink`](spawnforge_core::DiagnosticsSink), so assembly
//! progress shows up next to command output.
//!
//! ```rust
//! use spawnforge_console::{register_scene_commands, Console, ConsoleLog};
//! use spawnforge_core::Scene;
//! use std::sync::Arc;
//!
//! let mut console = Console::<Scene>::new(Arc::new(ConsoleLog::new()));
//! register_scene_commands(&mut console);
//! console.register_alias("pa", "playanimation");
//!
//! let mut scene = Scene::new();
//! console.execute(&mut scene, "pa Wave").unwrap();
//! assert_eq!(console.log().lines(), vec!["No animation driver found on any actor."]);
//! ```

pub mod commands;
pub mod console;
pub mod log;

pub use commands::{register_scene_commands, SceneAccess};
pub use console::{Console, ConsoleError, Handler};
pub use log::ConsoleLog;
