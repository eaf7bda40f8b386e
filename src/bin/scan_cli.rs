//! Feed decoded QR payloads (one per line, e.g. from `zbarcam --raw`) through a
//! scan session and export the rows to Excel when the input ends.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use dispatch_qr_scanner_lib::config::parse_debounce_ms;
use dispatch_qr_scanner_lib::decoder::{FacingMode, LineSource, ScanConfig, ScanSource};
use dispatch_qr_scanner_lib::excel::{self, ExportOutcome};
use dispatch_qr_scanner_lib::{logging, ScanRow, ScanSession, ScanSummary, ScannerConfig, SchemaChoice};

#[derive(Parser, Debug)]
#[command(name = "scan-cli", version, about = "Collect dispatch QR scans and export them to Excel")]
struct Args {
    /// File of decoded payloads, one per line (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Export file (default: <export dir>/groundnut_dispatch_scans.xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the default export file (default: Downloads)
    #[arg(long, env = "QR_SCANNER_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Payload layout: dispatch, society or detect
    #[arg(long, env = "QR_SCANNER_SCHEMA")]
    schema: Option<SchemaChoice>,

    /// Busy window in milliseconds after each processed scan; use 0 when replaying a file
    #[arg(long = "debounce-ms", env = "QR_SCANNER_DEBOUNCE_MS", value_parser = parse_debounce_ms)]
    debounce: Option<Duration>,

    /// Print the summary and rows as JSON on stdout
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    summary: &'a ScanSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_path: Option<String>,
    rows: &'a [ScanRow],
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = ScannerConfig::from_env().context("reading QR_SCANNER_* settings")?;
    if let Some(debounce) = args.debounce {
        config.debounce = debounce;
    }
    if let Some(schema) = args.schema {
        config.schema = schema;
    }
    if args.export_dir.is_some() {
        config.export_dir = args.export_dir.clone();
    }

    let reader: Box<dyn BufRead + Send> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let export_target = args
        .output
        .clone()
        .unwrap_or_else(|| excel::default_export_path(config.export_dir.as_deref()));

    let session = ScanSession::shared(config);
    let sink = session.clone();
    let quiet = args.json;

    let mut source = LineSource::new(reader);
    source.start(
        FacingMode::default(),
        &ScanConfig::default(),
        Box::new(move |raw: String| {
            let Ok(mut session) = sink.lock() else {
                tracing::error!("scan session lock poisoned, dropping scan");
                return;
            };
            session.ingest(&raw);
            if !quiet {
                let summary = session.summary();
                println!("{} | Scanned: {} | {}", summary.message, summary.count, summary.last_scan);
            }
        }),
    )?;
    // Rows already accepted are exported even if the reader failed part way.
    match source.join() {
        Ok(delivered) => tracing::debug!(delivered, "input finished"),
        Err(e) => tracing::error!(error = %e, "decoder stopped early, exporting scans collected so far"),
    }

    let session = session
        .lock()
        .map_err(|_| anyhow::anyhow!("scan session lock poisoned"))?;
    let outcome = excel::export_rows(session.rows(), &export_target)?;

    let export_path = match &outcome {
        ExportOutcome::Written { path, rows } => {
            if !quiet {
                println!("Exported {} row(s) to {}", rows, path.display());
            }
            Some(path.display().to_string())
        }
        ExportOutcome::NothingToExport => {
            if !quiet {
                println!("No QR scanned! Nothing to export.");
            }
            None
        }
    };

    if quiet {
        let report = Report {
            summary: session.summary(),
            export_path,
            rows: session.rows(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
