//! Built-in console commands
//!
//! One concrete handler type per command. Handlers receive already-parsed
//! options plus the leftover positional tokens and report domain errors
//! through the context's output channel; only `quit` ends the loop.

use tracing::info;

use crate::grammar::{OptType, OptionGrammar, ParsedOptions};
use crate::session::SessionId;

use super::registry::{CommandContext, CommandHandler, CommandOutcome, CommandRegistry};

/// Dispatched for blank input lines; produces no output
pub struct EmptyCommand;

impl CommandHandler for EmptyCommand {
    fn execute(
        &self,
        _ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        _args: &[String],
    ) -> CommandOutcome {
        CommandOutcome::Continue
    }
}

pub struct QuitCommand;

impl CommandHandler for QuitCommand {
    fn execute(
        &self,
        _ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        _args: &[String],
    ) -> CommandOutcome {
        info!("quit requested");
        CommandOutcome::Quit
    }
}

/// Lists registered command names, sorted, one per line
pub struct HelpCommand;

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        _args: &[String],
    ) -> CommandOutcome {
        let names: Vec<String> = ctx.command_names.to_vec();
        for name in &names {
            ctx.output(name);
        }
        CommandOutcome::Continue
    }
}

/// Screen-clear emulation: a tall block of blank lines
pub struct ClearCommand;

const CLEAR_LINES: usize = 1000;

impl CommandHandler for ClearCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        _args: &[String],
    ) -> CommandOutcome {
        for _ in 0..CLEAR_LINES {
            ctx.output("");
        }
        CommandOutcome::Continue
    }
}

pub struct SessionsCommand;

impl CommandHandler for SessionsCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        _args: &[String],
    ) -> CommandOutcome {
        ctx.output("Sessions:");
        ctx.show_sessions();
        CommandOutcome::Continue
    }
}

/// `session -l` lists; `session -i <id>` attaches the console to a session
pub struct SessionCommand;

impl SessionCommand {
    fn list(ctx: &mut CommandContext<'_>) {
        ctx.output("Known sessions:");
        ctx.show_sessions();
    }
}

impl CommandHandler for SessionCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        opts: &ParsedOptions,
        _args: &[String],
    ) -> CommandOutcome {
        if opts.flag("l") {
            Self::list(ctx);
            return CommandOutcome::Continue;
        }

        let Some(raw_id) = opts.integer("i") else {
            Self::list(ctx);
            return CommandOutcome::Continue;
        };

        let session = SessionId::try_from(raw_id)
            .ok()
            .and_then(|id| ctx.manager.get_by_local_id(id).map(|s| s.local_id));

        match session {
            Some(id) => {
                ctx.manager.attach_session(id);
                ctx.attach.attach(id);
            }
            None => {
                ctx.error(&format!("Session {raw_id} not found!"));
                ctx.show_sessions();
            }
        }
        CommandOutcome::Continue
    }
}

/// `set <name>=<value>`: forwards to the option store
pub struct SetCommand;

const SET_USAGE: &str = "Usage: set <name>=<value>";

impl CommandHandler for SetCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        args: &[String],
    ) -> CommandOutcome {
        if args.is_empty() {
            ctx.output(SET_USAGE);
            ctx.output("");
            ctx.show_options();
            return CommandOutcome::Continue;
        }

        // Tokens are re-joined so values may contain spaces, then split
        // once at the first '='
        let joined = args.join(" ");
        match joined.split_once('=') {
            Some((name, value)) => ctx.manager.set_option(name, value),
            None => ctx.output(SET_USAGE),
        }
        CommandOutcome::Continue
    }
}

/// `show options`: enumerates the option store
pub struct ShowCommand;

const SHOW_USAGE: &str = "Usage: show options";

impl CommandHandler for ShowCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        args: &[String],
    ) -> CommandOutcome {
        match args {
            [target] if target == "options" => ctx.show_options(),
            _ => ctx.output(SHOW_USAGE),
        }
        CommandOutcome::Continue
    }
}

/// `kill <session_id>`: tears down a session through the manager
pub struct KillCommand;

const KILL_USAGE: &str = "Usage: kill <session_id>";

impl CommandHandler for KillCommand {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _opts: &ParsedOptions,
        args: &[String],
    ) -> CommandOutcome {
        let [raw_id] = args else {
            ctx.output(KILL_USAGE);
            return CommandOutcome::Continue;
        };

        // Non-numeric ids are rejected outright rather than silently
        // coerced to 0
        let Ok(id) = raw_id.parse::<SessionId>() else {
            ctx.error(&format!("Invalid session id: {raw_id}"));
            return CommandOutcome::Continue;
        };

        if ctx.manager.kill_session(id) {
            ctx.output("Session killed");
        } else {
            ctx.output("Couldn't kill session!");
        }
        CommandOutcome::Continue
    }
}

/// Register every built-in command plus the alias table
pub fn install(registry: &mut CommandRegistry) {
    registry.register("", OptionGrammar::default(), Box::new(EmptyCommand));

    registry.register(
        "quit",
        OptionGrammar::new("Exits the console"),
        Box::new(QuitCommand),
    );

    registry.register(
        "help",
        OptionGrammar::new("Lists all commands, sorted alphabetically"),
        Box::new(HelpCommand),
    );

    registry.register(
        "clear",
        OptionGrammar::new("Clears the screen"),
        Box::new(ClearCommand),
    );

    registry.register(
        "sessions",
        OptionGrammar::new("Lists the current active sessions"),
        Box::new(SessionsCommand),
    );

    registry.register(
        "session",
        OptionGrammar::new("Interact with a particular session")
            .opt("i", OptType::Integer, false, "Attach to the chosen session")
            .opt("l", OptType::Flag, false, "List sessions"),
        Box::new(SessionCommand),
    );

    registry.register(
        "set",
        OptionGrammar::new("Set <name>=<value> variables"),
        Box::new(SetCommand),
    );

    registry.register(
        "show",
        OptionGrammar::new("Shows current variables if 'show options' is run"),
        Box::new(ShowCommand),
    );

    registry.register(
        "kill",
        OptionGrammar::new("Terminate a session"),
        Box::new(KillCommand),
    );

    registry.alias("q", "quit");
    registry.alias("exit", "quit");
}
