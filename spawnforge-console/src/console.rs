//! Command dispatch
//!
//! Input is one line: a command token and an optional argument separated by
//! a space. The token is lower-cased, resolved through the alias table
//! (exact match), then dispatched to the registered handler.

use crate::log::ConsoleLog;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Command handler: `(context, argument, log)`
pub type Handler<C> = Box<dyn Fn(&mut C, &str, &ConsoleLog) + Send + Sync>;

/// Errors raised while dispatching a line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),
}

enum Action<C> {
    Help,
    Aliases,
    Custom(Handler<C>),
}

struct Command<C> {
    name: String,
    description: String,
    action: Action<C>,
}

/// Line-oriented command console over a host context `C`
pub struct Console<C> {
    commands: Vec<Command<C>>,
    aliases: Vec<(String, String)>,
    log: Arc<ConsoleLog>,
}

impl<C> Console<C> {
    /// Console with the built-in `help` and `aliases` commands
    pub fn new(log: Arc<ConsoleLog>) -> Self {
        let mut console = Self {
            commands: Vec::new(),
            aliases: Vec::new(),
            log,
        };
        console.insert("help", "list commands or describe one", Action::Help);
        console.insert("aliases", "list registered aliases", Action::Aliases);
        console
    }

    pub fn log(&self) -> &Arc<ConsoleLog> {
        &self.log
    }

    /// Register a command, replacing any command of the same name
    pub fn register<F>(&mut self, name: &str, description: &str, handler: F)
    where
        F: Fn(&mut C, &str, &ConsoleLog) + Send + Sync + 'static,
    {
        self.insert(name, description, Action::Custom(Box::new(handler)));
    }

    fn insert(&mut self, name: &str, description: &str, action: Action<C>) {
        let command = Command {
            name: name.to_string(),
            description: description.to_string(),
            action,
        };
        match self.commands.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    /// Map `alias` to the command `original`
    pub fn register_alias(&mut self, alias: &str, original: &str) {
        match self.aliases.iter_mut().find(|(a, _)| a == alias) {
            Some((_, target)) => *target = original.to_string(),
            None => self.aliases.push((alias.to_string(), original.to_string())),
        }
    }

    /// Command names in registration order
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// Resolve a token through the alias table
    pub fn resolve<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == token)
            .map(|(_, original)| original.as_str())
            .unwrap_or(token)
    }

    /// Run one line of input
    ///
    /// Every outcome, failures included, is also written to the log.
    pub fn execute(&self, context: &mut C, input: &str) -> Result<(), ConsoleError> {
        let input = input.trim();
        if input.is_empty() {
            self.log.send("Empty command.");
            return Err(ConsoleError::Empty);
        }

        let mut parts = input.split(' ');
        let token = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().unwrap_or_default();
        let name = self.resolve(&token);

        let Some(command) = self.commands.iter().find(|c| c.name == name) else {
            self.log.send(format!("Unknown command: {name}"));
            return Err(ConsoleError::Unknown(name.to_string()));
        };

        tracing::debug!(command = name, arg, "console command");
        match &command.action {
            Action::Help => self.help(arg),
            Action::Aliases => {
                self.log.send("Registered aliases:");
                for (alias, original) in &self.aliases {
                    self.log.send(format!("{alias} => {original}"));
                }
            }
            Action::Custom(handler) => handler(context, arg, &self.log),
        }
        Ok(())
    }

    fn help(&self, arg: &str) {
        if arg.is_empty() {
            self.log.send("Available commands:");
            for command in &self.commands {
                self.log.send(format!("- {}", command.name));
            }
            return;
        }

        match self.commands.iter().find(|c| c.name == arg) {
            Some(command) => self.log.send(format!(
                "Command '{arg}' is registered: {}",
                command.description
            )),
            None => self.log.send(format!("Command '{arg}' not found.")),
        }
    }
}

impl<C> fmt::Debug for Console<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("commands", &self.command_names().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}
