//! Print the rows of an exported scan workbook, tab-separated.

use clap::Parser;
use std::path::PathBuf;

use dispatch_qr_scanner_lib::excel::{read_sheet_rows, EXPORT_SHEET_NAME};
use dispatch_qr_scanner_lib::logging;

#[derive(Parser, Debug)]
#[command(name = "dump_excel", about = "Dump a scan export workbook")]
struct Args {
    path: PathBuf,

    #[arg(long, default_value = EXPORT_SHEET_NAME)]
    sheet: String,
}

fn main() -> anyhow::Result<()> {
    logging::init(false);
    let args = Args::parse();
    let rows = read_sheet_rows(&args.path, &args.sheet)?;
    for row in &rows {
        println!("{}", row.join("\t"));
    }
    tracing::info!(rows = rows.len().saturating_sub(1), sheet = %args.sheet, "data rows");
    Ok(())
}
