// plantnet CLI - RFID census of IDF/MDF telecom closets

mod census;
mod exit_codes;
mod inventory;
mod settings_cmd;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plantnet_census::{CensusError, CensusPolicy};
use plantnet_config::Settings;
use plantnet_store::{SqliteStore, StoreError};

use exit_codes::{census_exit_code, store_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "plantnet")]
#[command(about = "RFID census of telecom closets: compare what the reader saw with what the inventory says")]
#[command(version, long_version = long_version())]
struct Cli {
    /// SQLite database (default: settings file, then the user data dir)
    #[arg(long, global = true, env = "PLANTNET_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Organization to operate on
    #[arg(long, global = true, env = "PLANTNET_ORG", value_name = "ORG")]
    org: Option<String>,

    /// Operator recorded on new censuses (default: settings, then $USER)
    #[arg(long = "as", global = true, value_name = "USER")]
    performed_by: Option<String>,

    /// Reconciliation policy TOML
    #[arg(long, global = true, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: inventory::DbCommands,
    },

    /// Plants, buildings and telecom closets
    Location {
        #[command(subcommand)]
        command: inventory::LocationCommands,
    },

    /// Registered equipment and its RFID tags
    Equipment {
        #[command(subcommand)]
        command: inventory::EquipmentCommands,
    },

    /// Run, review and reconcile RFID censuses
    Census {
        #[command(subcommand)]
        command: census::CensusCommands,
    },

    /// Show or change user settings
    Config {
        #[command(subcommand)]
        command: settings_cmd::ConfigCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("PLANTNET_GIT_HASH"), ")",
        "\ntarget:  ", env!("PLANTNET_TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        settings: Settings::load(),
        db: cli.db,
        org: cli.org,
        performed_by: cli.performed_by,
        policy: cli.policy,
    };

    let result = match cli.command {
        Commands::Db { command } => inventory::cmd_db(&ctx, command),
        Commands::Location { command } => inventory::cmd_location(&ctx, command),
        Commands::Equipment { command } => inventory::cmd_equipment(&ctx, command),
        Commands::Census { command } => census::cmd_census(&ctx, command),
        Commands::Config { command } => settings_cmd::cmd_config(&ctx, command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Context: flags > env > settings file > defaults
// ============================================================================

pub struct Context {
    pub settings: Settings,
    db: Option<PathBuf>,
    org: Option<String>,
    performed_by: Option<String>,
    policy: Option<PathBuf>,
}

impl Context {
    pub fn database_path(&self) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| self.settings.effective_database())
    }

    pub fn organization(&self) -> Result<String, CliError> {
        self.org
            .clone()
            .or_else(|| self.settings.organization.clone())
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .ok_or_else(|| {
                CliError::args("no organization selected").with_hint(
                    "pass --org, set PLANTNET_ORG, or run `plantnet config set organization <ORG>`",
                )
            })
    }

    pub fn performed_by(&self) -> String {
        match self.performed_by {
            Some(ref user) => user.clone(),
            None => self.settings.effective_performed_by(),
        }
    }

    pub fn policy(&self) -> Result<CensusPolicy, CliError> {
        let Some(path) = self.policy.as_ref().or(self.settings.policy_file.as_ref()) else {
            return Ok(CensusPolicy::default());
        };
        let text = read_input(path)?;
        let policy = CensusPolicy::from_toml(&text)
            .map_err(|e| CliError::from(e).with_hint(format!("check {}", path.display())))?;
        log::debug!("policy from {}: {:?}", path.display(), policy);
        Ok(policy)
    }

    /// Open (creating if needed) the configured database.
    pub fn open_store(&self) -> Result<SqliteStore, CliError> {
        let path = self.database_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::io(format!("cannot create {}: {e}", parent.display())))?;
        }
        log::debug!("opening database {}", path.display());
        Ok(SqliteStore::open(&path)?)
    }
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

/// Write `contents` to `path` and note it on stderr.
pub fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CensusError> for CliError {
    fn from(err: CensusError) -> Self {
        let hint = match &err {
            CensusError::NotCensusLocation { .. } => {
                Some("only IDF and MDF locations are censused; see `plantnet location list`".to_string())
            }
            CensusError::MissingColumn { .. } => {
                Some("expected header: equipo_id,nombre,ubicacion_id,rfid_tag_id".to_string())
            }
            _ => None,
        };
        Self { code: census_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Census(inner) => inner.into(),
            kind @ StoreError::UnknownLocationKind(_) => {
                Self::new(store_exit_code(&kind), kind.to_string())
                    .with_hint("valid types: Planta, Edificio, IDF, MDF, Rack")
            }
            other => Self::new(store_exit_code(&other), other.to_string()),
        }
    }
}
