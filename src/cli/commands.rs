//! Command dispatch for one-shot subcommands and the interactive shell

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::repl::Repl;
use crate::config::{global_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::RustylineReader;
use crate::infrastructure::InfraError;

/// Load settings (config file, env, then CLI flags) and run the selected command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        None | Some(Commands::Repl) => run_repl(&container),
        Some(Commands::List) => cmd_list(&container),
        Some(Commands::Show { name }) => cmd_show(&container, name),
        Some(Commands::Info { name }) => cmd_info(&container, name),
        Some(Commands::Config { command }) => cmd_config(&container, cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[instrument(skip(container))]
fn run_repl(container: &ServiceContainer) -> CliResult<()> {
    let reader = RustylineReader::new(container.settings.history_file.clone()).map_err(|e| {
        InfraError::Readline {
            message: e.to_string(),
        }
    })?;
    let mut repl =
        Repl::new(container.manager(), reader).with_confirm_delete(container.settings.confirm_delete);
    repl.run()
}

#[instrument(skip(container))]
fn cmd_list(container: &ServiceContainer) -> CliResult<()> {
    let mut names = container.storage().list_saved()?;
    names.sort();
    if names.is_empty() {
        output::info("No mind maps found");
    }
    for name in names {
        output::info(&name);
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, name: &str) -> CliResult<()> {
    let map = container.storage().load(name)?;
    output::info(&map.render_outline());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_info(container: &ServiceContainer, name: &str) -> CliResult<()> {
    let map = container.storage().load(name)?;
    let stats = map.stats();
    output::header(&format!("Mind Map: {}", map.title));
    output::detail(&format!("Root Node: {}", map.root_title()));
    output::detail(&format!("Nodes: {}", stats.node_count));
    output::detail(&format!("Maximum depth: {}", stats.max_depth));
    Ok(())
}

fn cmd_config(container: &ServiceContainer, cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let config_path = cli.config.clone().or_else(global_config_path);
            match config_path {
                Some(path) => output::action("config", &path.display()),
                None => output::warning("no config directory available"),
            }
            output::action("data", &container.settings.data_dir.display());
            if let Some(history) = &container.settings.history_file {
                output::action("history", &history.display());
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = cli
                .config
                .clone()
                .or_else(global_config_path)
                .ok_or_else(|| CliError::Usage("no config directory available".into()))?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}
