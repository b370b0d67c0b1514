//! Command dispatch: maps parsed arguments onto services

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::ServiceContainer;

/// Execute the parsed command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => execute_config(cli, command),
        command => {
            let settings = effective_settings(cli)?;
            let container = ServiceContainer::new(settings);
            execute_document(&container, command)
        }
    }
}

/// Loads settings and applies command-line overrides on top.
pub fn effective_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load()?;
    apply_cli_overrides(&mut settings, cli)?;
    debug!(?settings, "effective settings");
    Ok(settings)
}

/// Command-line flags are the highest-precedence config layer.
pub fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) -> CliResult<()> {
    if let Some(output_type) = &cli.output_type {
        settings.output_type = Some(output_type.clone());
    }
    if cli.compact {
        settings.json_compact = true;
    }
    if let Some(prefix) = &cli.prefix {
        settings.env_prefix = prefix.clone();
    }
    settings
        .validate()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))
}

#[instrument(level = "debug", skip(container))]
fn execute_document(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    let service = container.format_service();
    match command {
        Commands::Convert { input, output } => service.convert(input, output)?,
        Commands::Merge {
            original,
            mixin,
            output,
        } => service.merge(original, mixin, output)?,
        Commands::Set { file, key, value } => service.set(file, key, value)?,
        Commands::Config { .. } | Commands::Completion { .. } => {
            return Err(CliError::Usage("not a document command".into()))
        }
    }
    Ok(())
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = effective_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not found)" };
                output::info(&format!("{}{}", path.display(), state));
            }
            None => output::warning("no config directory on this platform"),
        },
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| ApplicationError::Config {
                message: "no config directory on this platform".into(),
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }

            ServiceContainer::new(Settings::default()).install_config_template(&path)?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
