use colored::Colorize;
use conmux::{
    AppResult, cli::Cli, config::Config, console::Console, init_logging, session::SessionManager,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load_or_default(&cli.config_file);

    // Initialize logging; the guard keeps the file writer alive
    let log_file = if config.log.file_path.is_empty() {
        None
    } else {
        Some(config.log.file_path.as_str())
    };
    let _log_guard = init_logging(&cli.effective_log_level(), log_file)?;

    tracing::info!("conmux console starting...");
    tracing::debug!("CLI arguments: {:?}", cli);

    // Create the session manager and seed its option store
    let mut manager = SessionManager::new();
    for (name, value) in &config.options {
        manager.set_option(name, value);
    }

    println!("{}", "conmux operator console".bold());
    println!("Type 'help' for available commands.");

    let mut console = Console::new(&config, manager);
    console
        .run(tokio::io::BufReader::new(tokio::io::stdin()))
        .await?;

    Ok(())
}
