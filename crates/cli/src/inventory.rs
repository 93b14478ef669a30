//! `plantnet db|location|equipment`: inventory seeding and lookup.

use std::path::PathBuf;

use clap::Subcommand;
use plantnet_store::{Equipment, Location, LocationKind};
use serde_json::json;

use crate::{read_input, to_json, CliError, Context};

#[derive(Subcommand)]
pub enum DbCommands {
    /// Create the database and its tables (idempotent)
    #[command(after_help = "\
Examples:
  plantnet db init
  plantnet --db ./site.db --org acme db init")]
    Init,
}

#[derive(Subcommand)]
pub enum LocationCommands {
    /// Register a location
    #[command(after_help = "\
Examples:
  plantnet location add P1 'Planta Norte' --tipo Planta
  plantnet location add IDF-1 'IDF piso 1' --tipo IDF --parent P1")]
    Add {
        /// Location id, unique across the database
        id: String,

        /// Display name
        nombre: String,

        /// Planta, Edificio, IDF, MDF or Rack
        #[arg(long)]
        tipo: String,

        /// Parent location (must belong to the same organization)
        #[arg(long)]
        parent: Option<String>,
    },

    /// List the organization's locations
    List {
        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum EquipmentCommands {
    /// Import equipment from CSV (all rows or none)
    #[command(after_help = "\
CSV header: equipo_id,nombre,ubicacion_id,rfid_tag_id (nombre optional).
An empty rfid_tag_id registers the equipment without a tag.

Examples:
  plantnet equipment import inventory.csv
  cat inventory.csv | plantnet equipment import -")]
    Import {
        /// CSV file, or - for stdin
        file: PathBuf,
    },

    /// Register one piece of equipment
    #[command(after_help = "\
Examples:
  plantnet equipment add SW-01 'Core switch' --location IDF-1 --tag E2801160600002"
    )]
    Add {
        id: String,

        nombre: String,

        #[arg(long)]
        location: String,

        /// RFID tag id; omit for untagged equipment
        #[arg(long)]
        tag: Option<String>,
    },

    /// List equipment registered at a location
    List {
        location: String,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_db(ctx: &Context, cmd: DbCommands) -> Result<(), CliError> {
    match cmd {
        DbCommands::Init => {
            let store = ctx.open_store()?;
            if let Ok(org) = ctx.organization() {
                store.ensure_organization(&org)?;
            }
            eprintln!("initialized {}", ctx.database_path().display());
            Ok(())
        }
    }
}

pub fn cmd_location(ctx: &Context, cmd: LocationCommands) -> Result<(), CliError> {
    match cmd {
        LocationCommands::Add { id, nombre, tipo, parent } => {
            let org = ctx.organization()?;
            let tipo: LocationKind = tipo.parse()?;
            let store = ctx.open_store()?;
            store.add_location(
                &org,
                &Location { id: id.clone(), nombre, tipo, parent_id: parent },
            )?;
            eprintln!("added {tipo} {id}");
            Ok(())
        }
        LocationCommands::List { json } => {
            let org = ctx.organization()?;
            let locations = ctx.open_store()?.list_locations(&org)?;

            if json {
                let items: Vec<_> = locations
                    .iter()
                    .map(|l| {
                        json!({
                            "id": l.id,
                            "nombre": l.nombre,
                            "tipo": l.tipo.as_str(),
                            "parentId": l.parent_id,
                            "censusTarget": l.tipo.is_census_target(),
                        })
                    })
                    .collect();
                println!("{}", to_json(&items)?);
                return Ok(());
            }

            for l in &locations {
                println!(
                    "{:<16} {:<8} {:<32} {}",
                    l.id,
                    l.tipo.as_str(),
                    l.nombre,
                    l.parent_id.as_deref().unwrap_or("-"),
                );
            }
            eprintln!("{} locations in {org}", locations.len());
            Ok(())
        }
    }
}

pub fn cmd_equipment(ctx: &Context, cmd: EquipmentCommands) -> Result<(), CliError> {
    match cmd {
        EquipmentCommands::Import { file } => {
            let org = ctx.organization()?;
            let csv_data = read_input(&file)?;
            let count = ctx.open_store()?.import_equipment_csv(&org, &csv_data)?;
            eprintln!("imported {count} equipment rows into {org}");
            Ok(())
        }
        EquipmentCommands::Add { id, nombre, location, tag } => {
            let org = ctx.organization()?;
            let equipment = Equipment {
                id: id.clone(),
                nombre,
                ubicacion_id: location.clone(),
                rfid_tag_id: tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            };
            ctx.open_store()?.add_equipment(&org, &equipment)?;
            eprintln!("added {id} at {location}");
            Ok(())
        }
        EquipmentCommands::List { location, json } => {
            let org = ctx.organization()?;
            let equipment = ctx.open_store()?.equipment_at(&org, &location)?;

            if json {
                let items: Vec<_> = equipment
                    .iter()
                    .map(|e| {
                        json!({
                            "id": e.id,
                            "nombre": e.nombre,
                            "ubicacionId": e.ubicacion_id,
                            "rfidTagId": e.rfid_tag_id,
                        })
                    })
                    .collect();
                println!("{}", to_json(&items)?);
                return Ok(());
            }

            for e in &equipment {
                println!(
                    "{:<16} {:<24} {}",
                    e.id,
                    e.rfid_tag_id.as_deref().unwrap_or("(untagged)"),
                    e.nombre,
                );
            }
            eprintln!("{} equipment at {location}", equipment.len());
            Ok(())
        }
    }
}
