//! `plantnet config`: read and edit the user settings file.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use plantnet_config::Settings;

use crate::exit_codes::EXIT_ERROR;
use crate::{to_json, CliError, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum SettingKey {
    Database,
    Organization,
    PerformedBy,
    PolicyFile,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show {
        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Set a value in the settings file
    #[command(after_help = "\
Examples:
  plantnet config set organization acme
  plantnet config set database /srv/plantnet/plantnet.db
  plantnet config set policy-file ~/.config/plantnet/policy.toml")]
    Set {
        #[arg(value_enum)]
        key: SettingKey,
        value: String,
    },

    /// Remove a value from the settings file
    Unset {
        #[arg(value_enum)]
        key: SettingKey,
    },
}

pub fn cmd_config(ctx: &Context, cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Show { json } => {
            if json {
                println!("{}", to_json(&ctx.settings)?);
                return Ok(());
            }
            println!("settings file: {}", Settings::config_path().display());
            println!("database:      {}", ctx.database_path().display());
            println!(
                "organization:  {}",
                ctx.organization().unwrap_or_else(|_| "(none)".to_string())
            );
            println!("performed by:  {}", ctx.performed_by());
            println!(
                "policy file:   {}",
                ctx.settings
                    .policy_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(built-in defaults)".to_string())
            );
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut settings = ctx.settings.clone();
            apply(&mut settings, key, Some(value));
            save(&settings)
        }
        ConfigCommands::Unset { key } => {
            let mut settings = ctx.settings.clone();
            apply(&mut settings, key, None);
            save(&settings)
        }
    }
}

fn apply(settings: &mut Settings, key: SettingKey, value: Option<String>) {
    match key {
        SettingKey::Database => settings.database = value.map(PathBuf::from),
        SettingKey::Organization => settings.organization = value,
        SettingKey::PerformedBy => settings.performed_by = value,
        SettingKey::PolicyFile => settings.policy_file = value.map(PathBuf::from),
    }
}

fn save(settings: &Settings) -> Result<(), CliError> {
    settings
        .save()
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    eprintln!("wrote {}", Settings::config_path().display());
    Ok(())
}
