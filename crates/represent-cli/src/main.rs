use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use represent_core::config::DEFAULT_REFERENCE_URL;
use represent_core::contact::RawContact;
use represent_core::jurisdiction::{JurisdictionRecord, Registry, TidyReport};
use represent_core::{
    clean_address, clean_contact, clean_name, clean_string, clean_telephone_number, RawPerson,
    ReferenceConfig, ReferenceData, Resolver,
};

/// Represent - normalization and jurisdiction tooling for Canadian scrapers
///
/// Clean scraped values, normalize person records, and derive or check
/// jurisdiction metadata against the OCD division identifiers.
#[derive(Parser)]
#[command(name = "represent", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    reference: ReferenceArgs,

    /// Suppress status output (results are still printed)
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

// Every reference flag can also be set from the environment
#[derive(Args)]
struct ReferenceArgs {
    /// Read reference tables from this directory instead of the network
    #[arg(long, global = true, env = "REPRESENT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL of the reference tables
    #[arg(long, global = true, env = "REPRESENT_REFERENCE_URL", default_value = DEFAULT_REFERENCE_URL)]
    reference_url: String,

    /// Seconds to wait for each reference table
    #[arg(long, global = true, env = "REPRESENT_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,
}

impl ReferenceArgs {
    fn config(&self) -> ReferenceConfig {
        ReferenceConfig {
            base_url: self.reference_url.clone(),
            data_dir: self.data_dir.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CleanKind {
    Text,
    Name,
    Phone,
    Address,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a single value
    Clean {
        /// What the value is
        kind: CleanKind,
        /// Raw value as scraped
        value: String,
    },

    /// Classify and canonicalize one contact detail
    Contact {
        /// Raw contact label ("Bus.", "Téléphone", ...)
        contact_type: String,
        /// Raw contact value
        value: String,
        /// Raw note label
        #[arg(long)]
        note: Option<String>,
    },

    /// Normalize JSON-lines person records
    People {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Derive the identity of a jurisdiction
    Definition {
        /// Division id, jurisdiction id or geographic code
        id: String,
        /// Resolve the municipalities aggregate of a province
        #[arg(long)]
        aggregation: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scaffold a manifest entry for a new jurisdiction
    New {
        /// Division id or geographic code
        division_id: String,
    },

    /// Check a jurisdiction manifest against derived identities
    Tidy {
        /// Path to the manifest JSON
        manifest: PathBuf,
        /// Rewrite mismatched fields in place
        #[arg(long)]
        fix: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the council page of every manifest entry
    Urls {
        /// Path to the manifest JSON
        manifest: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            2
        }
    };

    process::exit(exit_code);
}

/// Logs go to stderr; `RUST_LOG` overrides the flags
fn init_tracing(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> represent_core::Result<i32> {
    match &cli.command {
        Commands::Clean { kind, value } => {
            let cleaned = match kind {
                CleanKind::Text => clean_string(value),
                CleanKind::Name => clean_name(value),
                CleanKind::Phone => clean_telephone_number(value),
                CleanKind::Address => clean_address(value),
            };
            println!("{}", cleaned);
            Ok(0)
        }
        Commands::Contact {
            contact_type,
            value,
            note,
        } => {
            let raw = RawContact::new(contact_type, value, note.as_deref());
            println!("{}", serde_json::to_string(&clean_contact(&raw))?);
            Ok(0)
        }
        Commands::People { file } => cmd_people(file.as_deref()),
        Commands::Definition {
            id,
            aggregation,
            json,
        } => {
            let resolver = load_resolver(&cli.reference)?;
            let identity = resolver.resolve_identifier(id, *aggregation)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&identity)?);
            } else {
                println!("module_name      {}", identity.module_name);
                println!("class_name       {}", identity.class_name);
                println!("jurisdiction_id  {}", identity.jurisdiction_id);
                println!("division_id      {}", identity.division_id);
                println!("division_name    {}", identity.division_name);
                println!("name             {}", identity.display_name);
                if let Some(code) = &identity.geographic_code {
                    println!("geographic_code  {}", code);
                }
                if let Some(division_type) = &identity.division_type {
                    println!("division_type    {}", division_type);
                }
                println!("url              {}", identity.url);
            }
            Ok(0)
        }
        Commands::New { division_id } => {
            let resolver = load_resolver(&cli.reference)?;
            let identity = resolver.resolve_identifier(division_id, false)?;
            let record = JurisdictionRecord::scaffold(&identity);
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(0)
        }
        Commands::Tidy {
            manifest,
            fix,
            json,
        } => cmd_tidy(cli, manifest, *fix, *json),
        Commands::Urls { manifest } => {
            let registry = Registry::load(manifest)?;
            for record in registry.records() {
                match record.council_page.as_deref().filter(|page| !page.is_empty()) {
                    Some(page) => println!("{:<60} {}", record.module_name, page),
                    None => println!("{:<60} council page not defined", record.module_name),
                }
            }
            Ok(0)
        }
        Commands::Version => {
            println!(
                "represent {} (represent-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(0)
        }
    }
}

fn load_resolver(args: &ReferenceArgs) -> represent_core::Result<Resolver> {
    let config = args.config();
    let reference = ReferenceData::load(config.source().as_ref())?;
    Ok(Resolver::new(reference))
}

// ── People ────────────────────────────────────────────────

fn cmd_people(file: Option<&Path>) -> represent_core::Result<i32> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawPerson = serde_json::from_str(&line).map_err(|err| {
            represent_core::Error::Validation(format!("line {}: {}", index + 1, err))
        })?;
        let person = raw.build();
        debug!(line = index + 1, person = %person.name, "normalized person");
        writeln!(out, "{}", serde_json::to_string(&person)?)?;
    }
    Ok(0)
}

// ── Tidy ──────────────────────────────────────────────────

fn cmd_tidy(cli: &Cli, manifest: &Path, fix: bool, json: bool) -> represent_core::Result<i32> {
    let mut registry = Registry::load(manifest)?;
    let resolver = load_resolver(&cli.reference)?;
    let report = registry.tidy(&resolver)?;

    let fixed = if fix && !report.is_valid() {
        let fixed = report.apply(&mut registry);
        registry.save(manifest)?;
        info!(path = %manifest.display(), fixed, "rewrote manifest");
        fixed
    } else {
        0
    };

    if json {
        print_tidy_json(&report, fixed)?;
    } else {
        print_tidy_human(cli.quiet, manifest, &report, fixed);
    }

    Ok(if report.is_valid() || fix { 0 } else { 1 })
}

fn print_tidy_json(report: &TidyReport, fixed: usize) -> represent_core::Result<()> {
    let output = serde_json::json!({
        "valid": report.is_valid(),
        "checked": report.checked,
        "skipped": report.skipped,
        "errors": report.errors().len(),
        "warnings": report.warnings().len(),
        "fixed": fixed,
        "findings": report.findings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tidy_human(quiet: bool, manifest: &Path, report: &TidyReport, fixed: usize) {
    for finding in report.errors() {
        eprintln!("{}", finding.to_string().red());
    }
    for finding in report.warnings() {
        eprintln!("{}", finding.to_string().yellow());
    }
    if quiet {
        return;
    }
    if fixed > 0 {
        println!(
            "{} {}: rewrote {} field(s)",
            "✓".green(),
            manifest.display(),
            fixed
        );
    } else if report.is_valid() {
        println!(
            "{} {}: {} jurisdiction(s) tidy",
            "✓".green(),
            manifest.display(),
            report.checked
        );
    } else {
        println!(
            "{} {}: {} error(s), {} warning(s)",
            "✗".red(),
            manifest.display(),
            report.errors().len(),
            report.warnings().len()
        );
    }
}
