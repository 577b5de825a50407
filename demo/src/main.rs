//! CHAINLOG — Demo CLI
//!
//! Exercises the full pipeline against a JSONL log file: append sample
//! events, verify the chain, migrate a legacy store, and cross-check the
//! operator manifest. This is the reference wiring for the collaborators
//! the library expects around it; a real deployment would drive the same
//! calls from its own API layer.
//!
//! Usage:
//!   cargo run -p demo -- append-sample --path events.jsonl --count 5
//!   cargo run -p demo -- verify --path events.jsonl
//!   cargo run -p demo -- migrate --path legacy.jsonl
//!   cargo run -p demo -- cross-check --path events.jsonl --manifest MANIFEST.toml

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chainlog_audit::{ChainAppender, FileLogStore};
use chainlog_contracts::{
    error::ChainlogResult,
    record::{EventDraft, RequestContext, SubjectRefs},
    value::CanonicalValue,
};
use chainlog_migrate::migrate;
use chainlog_verify::{cross_check, verify, Manifest, VerifyReport};

// ── CLI definition ────────────────────────────────────────────────────────────

/// CHAINLOG — tamper-evident event log demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CHAINLOG tamper-evident event log demo",
    long_about = "Appends sample security events to a hash-chained JSONL log,\n\
                  verifies chain integrity, migrates legacy stores, and\n\
                  cross-checks the operator manifest."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append sample events to the log at --path.
    AppendSample {
        /// The JSONL log file.
        #[arg(long)]
        path: PathBuf,
        /// How many sample events to append.
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
    /// Verify the full chain and render the report.
    Verify {
        /// The JSONL log file.
        #[arg(long)]
        path: PathBuf,
    },
    /// Upgrade a legacy (unchained) store into chained form.
    Migrate {
        /// The JSONL log file.
        #[arg(long)]
        path: PathBuf,
    },
    /// Verify, then compare the tip against a manifest summary document.
    CrossCheck {
        /// The JSONL log file.
        #[arg(long)]
        path: PathBuf,
        /// The TOML manifest document.
        #[arg(long)]
        manifest: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Structured logging. Set RUST_LOG=debug for per-record detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::AppendSample { path, count } => run_append_sample(path, count),
        Command::Verify { path } => run_verify(path),
        Command::Migrate { path } => run_migrate(path),
        Command::CrossCheck { path, manifest } => run_cross_check(path, manifest),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("demo error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_append_sample(path: PathBuf, count: usize) -> ChainlogResult<ExitCode> {
    let appender = ChainAppender::new(FileLogStore::new(path))?;

    for i in 0..count {
        let record = appender.append(sample_draft(i))?;
        println!(
            "appended seq={} action={} ownHash={}",
            record.seq, record.action, record.own_hash
        );
    }

    tracing::info!(count, "sample events appended");
    println!("tip: {}", appender.tip_hash()?);
    Ok(ExitCode::SUCCESS)
}

fn run_verify(path: PathBuf) -> ChainlogResult<ExitCode> {
    let store = FileLogStore::new(path);
    let report = verify(&store)?;
    render_report(&report);

    // Collaborator contract: non-zero exit when the chain is invalid.
    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_migrate(path: PathBuf) -> ChainlogResult<ExitCode> {
    let store = FileLogStore::new(path);
    let report = migrate(&store)?;

    println!("migrated: {}", report.migrated);
    for error in &report.errors {
        println!("  error: {error}");
    }

    Ok(if report.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_cross_check(path: PathBuf, manifest_path: PathBuf) -> ChainlogResult<ExitCode> {
    let store = FileLogStore::new(path);
    let report = verify(&store)?;
    render_report(&report);

    let manifest = Manifest::from_file(&manifest_path)?;
    let check = cross_check(&manifest, &report);
    println!("tip prefix found: {}", check.tip_prefix_found);
    println!("manifest stale:   {}", check.manifest_stale);

    // The cross-check is advisory; only chain validity decides the exit.
    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn render_report(report: &VerifyReport) {
    println!("valid:     {}", report.valid);
    println!("lineCount: {}", report.line_count);
    println!("lastHash:  {}", report.last_hash);
    for issue in &report.errors {
        println!("  line {}: {}", issue.line, issue.message);
    }
}

/// A rotating set of representative security events.
fn sample_draft(i: usize) -> EventDraft {
    let (action, payload) = match i % 3 {
        0 => (
            "LOGIN_FAIL",
            serde_json::json!({ "reason": "bad password", "attempt": (i + 1) as i64 }),
        ),
        1 => (
            "EXPORT_CREATED",
            serde_json::json!({ "format": "csv", "rows": 1240 }),
        ),
        _ => (
            "VIEW_OPENED",
            serde_json::json!({ "section": "receipts" }),
        ),
    };

    let payload: CanonicalValue =
        serde_json::from_value(payload).expect("sample payload is canonical");

    EventDraft {
        action: action.to_string(),
        actor: "user:demo".to_string(),
        subject_refs: SubjectRefs {
            receipt_id: Some(format!("rcpt-{}", uuid::Uuid::new_v4())),
            export_id: None,
            view_id: None,
        },
        payload,
        context: Some(RequestContext {
            origin: Some("127.0.0.1".to_string()),
            user_agent: Some("chainlog-demo/0.1".to_string()),
        }),
    }
}
