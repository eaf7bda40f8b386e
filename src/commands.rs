use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tauri::{AppHandle, State};

use crate::config::ScannerConfig;
use crate::excel::{self, ExportOutcome};
use crate::session::ScanSession;
use crate::types::{IngestStatus, ScanRow, ScanSummary};

pub struct AppState {
    pub session: Mutex<ScanSession>,
}

impl AppState {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            session: Mutex::new(ScanSession::new(config)),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, ScanSession>, String> {
        self.session.lock().map_err(|e| e.to_string())
    }
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub status: IngestStatus,
    pub summary: ScanSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub rows: usize,
    pub message: String,
}

#[derive(Deserialize)]
pub struct DecoderErrorPayload {
    pub phase: String,
    pub message: String,
}

const NOTHING_TO_EXPORT: &str = "No QR scanned!";

#[tauri::command]
pub fn get_app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command]
pub fn ingest_scan(state: State<'_, AppState>, raw: String) -> Result<IngestResponse, String> {
    let mut session = state.session()?;
    let status = session.ingest(&raw);
    Ok(IngestResponse {
        status,
        summary: session.summary().clone(),
    })
}

#[tauri::command]
pub fn get_scan_summary(state: State<'_, AppState>) -> Result<ScanSummary, String> {
    Ok(state.session()?.summary().clone())
}

#[tauri::command]
pub fn get_scan_rows(state: State<'_, AppState>) -> Result<Vec<ScanRow>, String> {
    Ok(state.session()?.rows().to_vec())
}

#[tauri::command]
pub fn reset_session(state: State<'_, AppState>) -> Result<ScanSummary, String> {
    let mut session = state.session()?;
    session.reset();
    Ok(session.summary().clone())
}

/// Save the row log to `path`, or to the default export location when `path` is empty.
#[tauri::command]
pub fn export_scans(state: State<'_, AppState>, path: Option<String>) -> Result<ExportResponse, String> {
    let session = state.session()?;
    let target = match path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => PathBuf::from(p),
        None => excel::default_export_path(session.config().export_dir.as_deref()),
    };
    match excel::export_rows(session.rows(), &target).map_err(|e| e.to_string())? {
        ExportOutcome::Written { path, rows } => Ok(ExportResponse {
            exported: true,
            path: path.to_str().map(String::from),
            rows,
            message: format!("Exported {} row(s)", rows),
        }),
        ExportOutcome::NothingToExport => Ok(ExportResponse {
            exported: false,
            path: None,
            rows: 0,
            message: NOTHING_TO_EXPORT.to_string(),
        }),
    }
}

#[tauri::command]
pub fn open_export_folder(path: String) -> Result<(), String> {
    let path = Path::new(&path);
    let folder = if path.is_dir() {
        path
    } else {
        path.parent().ok_or_else(|| "Invalid path".to_string())?
    };
    opener::open(folder).map_err(|e| e.to_string())
}

/// Camera start/stop failures reported by the webview; logged, never fatal.
#[tauri::command]
pub fn report_decoder_error(payload: DecoderErrorPayload) {
    tracing::warn!(phase = %payload.phase, error = %payload.message, "decoder error");
}
