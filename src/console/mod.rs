//! Interactive operator console
//!
//! Ties the pieces together: the console loop reads one line at a time,
//! the dispatcher resolves it against the command registry, and the
//! attachment state machine governs whether lines are parsed as commands
//! or forwarded to the attached session.

pub mod attach;
pub mod commands;
pub mod output;
pub mod registry;

pub use attach::AttachmentState;
pub use output::ConsoleIo;
pub use registry::{CommandContext, CommandHandler, CommandOutcome, CommandRegistry};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::config::Config;
use crate::grammar::GrammarError;
use crate::session::SessionManager;

/// What the console loop should do after one dispatched line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Quit,
}

/// Per-run counters, logged at shutdown
#[derive(Debug, Clone, Default)]
pub struct ConsoleStats {
    pub lines_read: u64,
    pub commands_executed: u64,
    pub errors_reported: u64,
}

pub struct Console {
    registry: CommandRegistry,
    manager: SessionManager,
    attach: AttachmentState,
    io: ConsoleIo,
    prompt: String,
    stats: ConsoleStats,
}

impl Console {
    pub fn new(config: &Config, manager: SessionManager) -> Self {
        let io = ConsoleIo::stdout(config.attach_marker.clone());
        Self::with_io(config, manager, io)
    }

    /// Construct with an explicit output channel (used by tests)
    pub fn with_io(config: &Config, manager: SessionManager, io: ConsoleIo) -> Self {
        let mut registry = CommandRegistry::new();
        commands::install(&mut registry);

        Self {
            registry,
            manager,
            attach: AttachmentState::default(),
            io,
            prompt: config.prompt.clone(),
            stats: ConsoleStats::default(),
        }
    }

    pub fn attachment(&self) -> &AttachmentState {
        &self.attach
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SessionManager {
        &mut self.manager
    }

    pub fn stats(&self) -> &ConsoleStats {
        &self.stats
    }

    /// Info message from a collaborator, framed per attachment state
    pub fn output(&mut self, message: &str) {
        self.io.output(self.attach.is_attached(), message);
    }

    /// Error message from a collaborator, framed per attachment state
    pub fn error(&mut self, message: &str) {
        self.stats.errors_reported += 1;
        self.io.error(self.attach.is_attached(), message);
    }

    /// External escape signal: return to command mode.
    ///
    /// The pass-through layer calls this when it recognizes the designated
    /// escape sequence.
    pub fn detach(&mut self) {
        if self.attach.detach().is_some() {
            self.manager.detach();
        }
    }

    /// Parse and execute one input line.
    ///
    /// Every per-line failure is rendered here and reported as `Continue`;
    /// only the quit command yields `Quit`.
    pub fn dispatch(&mut self, line: &str) -> DispatchOutcome {
        let mut tokens = line.split_whitespace();
        let token = tokens.next().unwrap_or("");
        let args: Vec<String> = tokens.map(str::to_string).collect();

        let name = self.registry.resolve(token);
        let Some(command) = self.registry.lookup(name) else {
            self.stats.errors_reported += 1;
            self.io
                .output(self.attach.is_attached(), &format!("Unknown command: {name}"));
            return DispatchOutcome::Continue;
        };

        debug!(command = name, ?args, "dispatching");

        let outcome = match command.grammar.parse(&args) {
            Err(GrammarError::HelpRequested(usage)) => {
                self.io.output(self.attach.is_attached(), &usage);
                DispatchOutcome::Continue
            }
            Err(err) => {
                self.stats.errors_reported += 1;
                self.io
                    .error(self.attach.is_attached(), &err.to_string());
                DispatchOutcome::Continue
            }
            Ok((opts, leftover)) => {
                let mut ctx = CommandContext {
                    manager: &mut self.manager,
                    attach: &mut self.attach,
                    io: &mut self.io,
                    command_names: self.registry.visible_names(),
                };
                self.stats.commands_executed += 1;
                match command.handler.execute(&mut ctx, &opts, &leftover) {
                    CommandOutcome::Continue => DispatchOutcome::Continue,
                    CommandOutcome::Quit => DispatchOutcome::Quit,
                }
            }
        };

        self.sync_attachment();
        outcome
    }

    /// If the attached session disappeared underneath us, fall back to
    /// command mode and tell the operator.
    fn sync_attachment(&mut self) {
        if let Some(id) = self.attach.attached_id() {
            if self.manager.get_by_local_id(id).is_none() {
                self.attach.detach();
                self.manager.detach();
                self.error(&format!("Session {id} no longer exists!"));
            }
        }
    }

    /// Console loop: read lines until EOF or quit.
    ///
    /// While detached each line goes through the dispatcher. While attached
    /// the dispatcher is bypassed and input is handed to the session's
    /// input queue. Read errors are treated identically to EOF.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            // Attached mode owns its own prompt marker via ConsoleIo
            if !self.attach.is_attached() {
                self.io.prompt(&self.prompt);
            }

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => break,
            };
            self.stats.lines_read += 1;

            if let Some(id) = self.attach.attached_id() {
                if !self.manager.forward_input(id, &line) {
                    self.sync_attachment();
                }
                continue;
            }

            if self.dispatch(&line) == DispatchOutcome::Quit {
                break;
            }
        }

        // Leave the cursor on a fresh line on the way out
        self.io.output(false, "");
        info!(
            lines = self.stats.lines_read,
            commands = self.stats.commands_executed,
            errors = self.stats.errors_reported,
            "console loop finished"
        );
        Ok(())
    }
}
