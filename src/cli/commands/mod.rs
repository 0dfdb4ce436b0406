//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod console;
pub mod run;
pub mod version;

use std::sync::Arc;

use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::cli::demo::{self, ConsoleSender};
use crate::config::{ConfigLoader, EngineConfig};
use crate::error::{CmdTreeError, ExitCode};
use crate::manager::CommandManager;
use crate::tree::CommandTree;

/// Dispatch a parsed CLI invocation and return the process exit code.
///
/// # Errors
///
/// Returns an error if configuration loading or tree construction fails.
pub async fn dispatch(cli: Cli) -> Result<i32, CmdTreeError> {
    if let Commands::Version(args) = &cli.command {
        version::run(args);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let manager = build_manager(&config)?;
    let sender = Arc::new(ConsoleSender::new(
        cli.sender.clone(),
        cli.permissions.clone(),
        cli.capabilities.clone(),
    ));

    match cli.command {
        Commands::Console(args) => console::run(&manager, sender, &args).await,
        Commands::Exec(args) => Ok(run::exec(&manager, sender, &args).await),
        Commands::Suggest(args) => run::suggest(&manager, sender, &args),
        Commands::List(args) => run::list(&manager, &sender, &args),
        Commands::Version(_) => Ok(ExitCode::SUCCESS),
    }
}

/// Loads the engine configuration and applies CLI overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or fails validation.
pub fn load_config(cli: &Cli) -> Result<EngineConfig, CmdTreeError> {
    let loader = ConfigLoader::default();
    let loaded = match &cli.config {
        Some(path) => loader.load(path)?,
        None => loader.load_defaults()?,
    };
    let mut config = loaded.config;
    if let Some(coordinator) = cli.coordinator {
        config.coordinator = coordinator.into();
    }
    debug!(?config, "engine configuration loaded");
    Ok(config)
}

/// Builds the demo tree and a manager following `config`.
///
/// # Errors
///
/// Returns an error if the tree cannot be built or the configuration
/// cannot be applied.
pub fn build_manager(config: &EngineConfig) -> Result<CommandManager<ConsoleSender>, CmdTreeError> {
    let mut tree = CommandTree::with_settings(config.tree_settings());
    demo::register(&mut tree)?;
    Ok(CommandManager::from_config(tree, config)?)
}
