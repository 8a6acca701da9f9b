//! CLI command implementations.

pub mod console;
pub mod init;
pub mod inspect;
pub mod spawn;

pub use console::run_console;
pub use init::init_project;
pub use inspect::inspect_catalog;
pub use spawn::{spawn_actors, SpawnOptions};
