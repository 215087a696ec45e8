//! rpdgen CLI
//!
//! Command-line interface for:
//! - Translating BDL record dumps (+ optional simulation results) into RPD
//!   report documents (`translate`)
//! - Validating RPD documents against the schema and reference catalogue
//!   (`validate`)
//! - Structurally comparing two RPD documents (`diff`)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rpdgen_bdl::JsonRecordSource;
use rpdgen_graph::{translate, EmptyResultService, JsonResultService, ResultService};
use rpdgen_match::{diff_documents, MatchOptions, MatchReportV1, Side};
use rpdgen_schema::doc::RulesetProjectDescription;
use rpdgen_validate::{validate_value, Severity, ValidationReportV1};

#[derive(Parser)]
#[command(name = "rpdgen")]
#[command(
    author,
    version,
    about = "Translate DOE-2 BDL models into RPD report documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a BDL record dump into an RPD document.
    Translate {
        /// Input records JSON (kind -> list of records)
        input: PathBuf,
        /// Simulation results JSON; omitted means an unsimulated model
        #[arg(long)]
        results: Option<PathBuf>,
        /// Project id used for the document root and shell objects
        #[arg(long, default_value = "Project")]
        project_id: String,
        /// Output RPD JSON (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Validate the document after building; findings are printed but
        /// never block emission
        #[arg(long)]
        validate: bool,
    },

    /// Validate an RPD document; exits non-zero on error findings.
    Validate {
        /// Input RPD JSON
        input: PathBuf,
        /// Write the full validation report JSON here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Structurally compare two RPD documents; exits non-zero when
    /// objects on either side are left unmatched.
    Diff {
        /// Candidate RPD JSON (the document under test)
        candidate: PathBuf,
        /// Reference RPD JSON (the document to match against)
        reference: PathBuf,
        /// Minimum name similarity for fallback matching
        #[arg(long, default_value_t = 0.8)]
        name_threshold: f64,
        /// Write the full match report JSON here
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Translate {
            input,
            results,
            project_id,
            out,
            validate,
        } => cmd_translate(&input, results.as_deref(), &project_id, out.as_deref(), validate),
        Commands::Validate { input, report } => cmd_validate(&input, report.as_deref()),
        Commands::Diff {
            candidate,
            reference,
            name_threshold,
            report,
        } => cmd_diff(&candidate, &reference, name_threshold, report.as_deref()),
    }
}

fn cmd_translate(
    input: &Path,
    results: Option<&Path>,
    project_id: &str,
    out: Option<&Path>,
    validate: bool,
) -> Result<ExitCode> {
    let source = JsonRecordSource::from_path(input)
        .with_context(|| format!("reading records from {}", input.display()))?;
    let service: Box<dyn ResultService> = match results {
        Some(path) => Box::new(
            JsonResultService::from_path(path)
                .with_context(|| format!("reading results from {}", path.display()))?,
        ),
        None => Box::new(EmptyResultService),
    };

    let document = translate(&source, service.as_ref(), project_id)
        .with_context(|| format!("translating {}", input.display()))?;
    let json = serde_json::to_string_pretty(&document)?;

    match out {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => println!("{json}"),
    }
    if validate {
        // Advisory only: the document was already emitted above.
        print_validation(input, &rpdgen_validate::validate_document(&document));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(input: &Path, report_out: Option<&Path>) -> Result<ExitCode> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;

    let report = validate_value(&value);
    print_validation(input, &report);
    if let Some(path) = report_out {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_validation(input: &Path, report: &ValidationReportV1) {
    println!("{} {}", "Validating".green().bold(), input.display());
    for finding in &report.findings {
        let label = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {label} [{}] {}: {}", finding.code, finding.path, finding.message);
    }
    let summary = &report.summary;
    if report.is_clean() {
        println!(
            "{} ({} warnings)",
            "Valid.".green(),
            summary.warnings
        );
    } else {
        println!(
            "{} {} errors, {} warnings",
            "Invalid.".red().bold(),
            summary.errors,
            summary.warnings
        );
    }
    if !summary.referential_checked {
        println!(
            "  {} referential checks skipped (schema errors present)",
            "→".yellow()
        );
    }
}

fn cmd_diff(
    candidate: &Path,
    reference: &Path,
    name_threshold: f64,
    report_out: Option<&Path>,
) -> Result<ExitCode> {
    let cand = read_document(candidate)?;
    let reff = read_document(reference)?;
    let options = MatchOptions {
        name_threshold,
        ..MatchOptions::default()
    };

    let report = diff_documents(&cand, &reff, &options);
    print_diff(&report);
    if let Some(path) = report_out {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_document(path: &Path) -> Result<RulesetProjectDescription> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_diff(report: &MatchReportV1) {
    for pair in &report.pairs {
        println!(
            "  {} {:?} {} ~ {} ({:?}, {:.2})",
            "paired".green(),
            pair.kind,
            pair.candidate_id,
            pair.reference_id,
            pair.basis,
            pair.score
        );
    }
    for unmatched in &report.unmatched {
        let side = match unmatched.side {
            Side::Candidate => "candidate",
            Side::Reference => "reference",
        };
        println!(
            "  {} {:?} {} ({side} only)",
            "unmatched".red().bold(),
            unmatched.kind,
            unmatched.id
        );
    }
    let summary = &report.summary;
    if report.is_complete() {
        println!("{} {} pairs", "Complete.".green(), summary.pairs);
    } else {
        println!(
            "{} {} pairs, {} candidate-only, {} reference-only",
            "Incomplete.".red().bold(),
            summary.pairs,
            summary.unmatched_candidate,
            summary.unmatched_reference
        );
    }
}
