pub mod clock;
#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod decoder;
pub mod error;
pub mod excel;
pub mod logging;
pub mod models;
pub mod parser;
pub mod session;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ScannerConfig;
pub use error::{ConfigError, DecoderError, ExportError};
pub use excel::{export_rows, render_workbook, ExportOutcome};
pub use models::{PayloadVariant, SchemaChoice};
pub use parser::parse_payload;
pub use session::{ScanSession, SharedSession};
pub use types::{IngestStatus, RowCell, ScanRow, ScanSummary};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::AppState;
    use tauri::Manager;

    logging::init(false);

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir().map_err(|e| e.to_string())?;
            // Let users drop a .env with QR_SCANNER_* settings into the app data folder
            let env_path = app_data_dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            }
            let config = ScannerConfig::from_env().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid scanner config, using defaults");
                ScannerConfig::default()
            });
            app.manage(AppState::new(config));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_version,
            commands::ingest_scan,
            commands::get_scan_summary,
            commands::get_scan_rows,
            commands::reset_session,
            commands::export_scans,
            commands::open_export_folder,
            commands::report_decoder_error,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
