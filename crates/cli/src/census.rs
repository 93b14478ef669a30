//! `plantnet census`: run, review and reconcile RFID censuses.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use plantnet_census::loader::{load_equipment_csv, split_for_location};
use plantnet_census::{
    reconcile, CensusHistory, CensusRecord, CensusRequest, CensusService, DiscrepancyReport,
};

use crate::exit_codes::{EXIT_CENSUS_DISCREPANCIES, EXIT_ERROR};
use crate::{read_input, to_json, write_output, CliError, Context};

#[derive(Subcommand)]
pub enum CensusCommands {
    /// Reconcile a tag scan against a closet's inventory and record it
    #[command(after_help = "\
Tags are read from --tags (or stdin): one per line, or comma/space separated.
A JSON request {\"ubicacionId\": ..., \"rfidTagsLeidos\": [...]} can be given with --request.

Exit code 3 means the census completed and found discrepancies.

Examples:
  plantnet census run IDF-1 --tags scan.txt
  reader-export | plantnet census run IDF-1
  plantnet census run IDF-1 --tags scan.txt --dry-run --json
  plantnet census run --request request.json --output report.json")]
    Run {
        /// Location (IDF or MDF) being censused
        #[arg(required_unless_present = "request", conflicts_with = "request")]
        location: Option<String>,

        /// Raw tag list file, or - for stdin (default: stdin)
        #[arg(long, conflicts_with = "request")]
        tags: Option<PathBuf>,

        /// JSON census request file, or - for stdin
        #[arg(long)]
        request: Option<PathBuf>,

        /// Reconcile without recording the census
        #[arg(long)]
        dry_run: bool,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List recorded censuses, newest first
    #[command(after_help = "\
Examples:
  plantnet census list
  plantnet census list --location IDF-1 --json")]
    List {
        /// Only censuses of this location
        #[arg(long)]
        location: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show one census with its tag list and report
    Show {
        id: String,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Delete a census and everything recorded with it
    Delete { id: String },

    /// Reconcile files offline, without a database
    #[command(after_help = "\
--expected uses the equipment CSV format (equipo_id,nombre,ubicacion_id,rfid_tag_id).
Rows of other locations are the organization-wide tag index.

Examples:
  plantnet census reconcile --expected inventory.csv --tags scan.txt --location IDF-1
  plantnet census reconcile --expected idf1.csv --tags scan.txt --json")]
    Reconcile {
        /// Equipment CSV
        #[arg(long)]
        expected: PathBuf,

        /// Raw tag list file, or - for stdin
        #[arg(long)]
        tags: PathBuf,

        /// Location to reconcile (default: the only location in --expected)
        #[arg(long)]
        location: Option<String>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_census(ctx: &Context, cmd: CensusCommands) -> Result<(), CliError> {
    match cmd {
        CensusCommands::Run { location, tags, request, dry_run, json, output } => {
            cmd_census_run(ctx, location, tags, request, dry_run, json, output)
        }
        CensusCommands::List { location, json } => cmd_census_list(ctx, location, json),
        CensusCommands::Show { id, json } => cmd_census_show(ctx, id, json),
        CensusCommands::Delete { id } => cmd_census_delete(ctx, id),
        CensusCommands::Reconcile { expected, tags, location, json } => {
            cmd_census_reconcile(ctx, expected, tags, location, json)
        }
    }
}

fn not_found(id: &str) -> CliError {
    CliError::new(EXIT_ERROR, format!("census '{id}' not found"))
        .with_hint("see `plantnet census list`")
}

fn cmd_census_run(
    ctx: &Context,
    location: Option<String>,
    tags: Option<PathBuf>,
    request_file: Option<PathBuf>,
    dry_run: bool,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let request = match (request_file, location) {
        (Some(path), _) => CensusRequest::from_json(&read_input(&path)?)?,
        (None, Some(location)) => {
            let raw = read_input(tags.as_deref().unwrap_or_else(|| Path::new("-")))?;
            CensusRequest::from_raw(location, &raw)
        }
        (None, None) => return Err(CliError::args("a location or --request is required")),
    };

    let org = ctx.organization()?;
    let policy = ctx.policy()?;
    let store = ctx.open_store()?;
    let service = CensusService::new(&store, &store, policy);

    let outcome = if dry_run {
        service.dry_run(&org, request)?
    } else {
        service.run_census(&org, &ctx.performed_by(), request)?
    };

    let json_str = to_json(&outcome)?;
    if let Some(ref path) = output_file {
        write_output(path, &json_str)?;
    }
    if json_output {
        println!("{json_str}");
    }

    match outcome.census_id {
        Some(ref id) => eprintln!("census {id} recorded"),
        None => eprintln!("dry run: nothing recorded"),
    }
    print_report_summary(&outcome.ubicacion_id, outcome.rfid_tags_leidos.len(), &outcome.report);

    discrepancy_exit(&outcome.report)
}

fn cmd_census_list(ctx: &Context, location: Option<String>, json_output: bool) -> Result<(), CliError> {
    let org = ctx.organization()?;
    let store = ctx.open_store()?;
    let records = store.list_censuses(&org, location.as_deref())?;

    if json_output {
        println!("{}", to_json(&records)?);
        return Ok(());
    }

    for r in &records {
        println!(
            "{}  {}  {:<12} {:>3} faltantes {:>3} no registrados  {}",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M:%S"),
            r.ubicacion_id,
            r.report.faltantes_count(),
            r.report.no_registrados_count(),
            r.performed_by,
        );
    }
    eprintln!("{} censuses", records.len());
    Ok(())
}

fn cmd_census_show(ctx: &Context, id: String, json_output: bool) -> Result<(), CliError> {
    let org = ctx.organization()?;
    let store = ctx.open_store()?;
    let record = store.get_census(&org, &id)?.ok_or_else(|| not_found(&id))?;

    if json_output {
        println!("{}", to_json(&record)?);
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn cmd_census_delete(ctx: &Context, id: String) -> Result<(), CliError> {
    let org = ctx.organization()?;
    let store = ctx.open_store()?;
    if !store.delete_census(&org, &id)? {
        return Err(not_found(&id));
    }
    eprintln!("deleted census {id}");
    Ok(())
}

fn cmd_census_reconcile(
    ctx: &Context,
    expected_path: PathBuf,
    tags_path: PathBuf,
    location: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    let rows = load_equipment_csv(&read_input(&expected_path)?)?;

    let location = match location {
        Some(l) => l,
        None => {
            let locations: BTreeSet<&str> = rows.iter().map(|r| r.ubicacion_id.as_str()).collect();
            match locations.len() {
                1 => locations.into_iter().next().unwrap_or_default().to_string(),
                0 => return Err(CliError::args("--expected has no rows").with_hint("pass --location")),
                n => {
                    return Err(CliError::args(format!("--expected covers {n} locations"))
                        .with_hint("pass --location to pick one"))
                }
            }
        }
    };

    let request = CensusRequest::from_raw(location, &read_input(&tags_path)?);
    request.validate()?;

    let policy = ctx.policy()?;
    let (expected, index) = split_for_location(&rows, &request.ubicacion_id);
    let report = reconcile(
        &request.ubicacion_id,
        &expected,
        &request.rfid_tags_leidos,
        &index,
        &policy,
    )?;

    if json_output {
        println!("{}", to_json(&report)?);
    }
    print_report_summary(&request.ubicacion_id, request.rfid_tags_leidos.len(), &report);

    discrepancy_exit(&report)
}

fn discrepancy_exit(report: &DiscrepancyReport) -> Result<(), CliError> {
    if report.is_clean() {
        return Ok(());
    }
    Err(CliError::new(EXIT_CENSUS_DISCREPANCIES, "discrepancies found"))
}

/// Human summary to stderr.
fn print_report_summary(location: &str, tags_read: usize, report: &DiscrepancyReport) {
    eprintln!(
        "census {location}: {tags_read} tags read, {} faltantes, {} no registrados",
        report.faltantes_count(),
        report.no_registrados_count(),
    );
    for d in report.discrepancias() {
        eprintln!("  {:<14} {}", d.kind().as_str(), d.subject());
    }
    for m in report.fuera_de_ubicacion() {
        eprintln!(
            "  fuera de ubicación: {} ({} registered at {})",
            m.rfid_tag_id, m.equipo_id, m.ubicacion_id
        );
    }
}

fn print_record(record: &CensusRecord) {
    println!("census:       {}", record.id);
    println!("location:     {}", record.ubicacion_id);
    println!("performed by: {}", record.performed_by);
    println!("created at:   {}", record.created_at.to_rfc3339());
    println!("tags read:    {}", record.rfid_tags_leidos.len());
    for tag in &record.rfid_tags_leidos {
        println!("  {tag}");
    }
    println!(
        "discrepancies: {} faltantes, {} no registrados",
        record.report.faltantes_count(),
        record.report.no_registrados_count(),
    );
    for d in record.report.discrepancias() {
        println!("  {:<14} {}", d.kind().as_str(), d.subject());
    }
    for m in record.report.fuera_de_ubicacion() {
        println!("  fuera de ubicación: {} ({} @ {})", m.rfid_tag_id, m.equipo_id, m.ubicacion_id);
    }
}
