//! Command registry and handler trait
//!
//! Maps command names to their option grammar and handler, with an alias
//! table consulted before lookup. Handlers are trait objects registered
//! once at startup; the registry is immutable afterwards.

use std::collections::{BTreeMap, HashMap};

use crate::grammar::{OptionGrammar, ParsedOptions};
use crate::session::SessionManager;

use super::attach::AttachmentState;
use super::output::ConsoleIo;

/// What the dispatcher should do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Quit,
}

/// Mutable console state handed to command handlers
pub struct CommandContext<'a> {
    pub manager: &'a mut SessionManager,
    pub attach: &'a mut AttachmentState,
    pub io: &'a mut ConsoleIo,
    /// Sorted non-empty command names, for help output
    pub command_names: &'a [String],
}

impl CommandContext<'_> {
    pub fn output(&mut self, message: &str) {
        self.io.output(self.attach.is_attached(), message);
    }

    pub fn error(&mut self, message: &str) {
        self.io.error(self.attach.is_attached(), message);
    }

    /// List every live session, one line each
    pub fn show_sessions(&mut self) {
        let mut lines = Vec::new();
        self.manager.each_session(|_, session| lines.push(session.to_string()));
        for line in lines {
            self.output(&line);
        }
    }

    /// List the option store as name => value lines
    pub fn show_options(&mut self) {
        let mut lines = Vec::new();
        self.manager
            .each_option(|name, value| lines.push(format!("{name} => {value}")));
        for line in lines {
            self.output(&line);
        }
    }
}

/// A single console command: parse options with the grammar, then execute
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        opts: &ParsedOptions,
        args: &[String],
    ) -> CommandOutcome;
}

pub struct RegisteredCommand {
    pub grammar: OptionGrammar,
    pub handler: Box<dyn CommandHandler>,
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, RegisteredCommand>,
    aliases: HashMap<String, String>,
    visible_names: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. The empty name is valid and names the no-op
    /// command dispatched for blank input lines.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        grammar: OptionGrammar,
        handler: Box<dyn CommandHandler>,
    ) {
        let name = name.into();
        if !name.is_empty() {
            self.visible_names.push(name.clone());
            self.visible_names.sort();
        }
        self.commands.insert(name, RegisteredCommand { grammar, handler });
    }

    /// Map an alternate spelling to a canonical command name.
    /// An alias to an unregistered command is a construction-time defect.
    pub fn alias(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let to = to.into();
        assert!(
            self.commands.contains_key(&to),
            "alias target '{to}' is not a registered command"
        );
        self.aliases.insert(from.into(), to);
    }

    /// Resolve an input token through the alias table
    pub fn resolve<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Exact-match, case-sensitive lookup by canonical name
    pub fn lookup(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    /// Sorted non-empty command names
    pub fn visible_names(&self) -> &[String] {
        &self.visible_names
    }
}
