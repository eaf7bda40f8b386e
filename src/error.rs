use thiserror::Error;

/// Errors raised while writing or reading back an export workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not write Excel file: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Could not open Excel file: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Sheet '{0}' not found.")]
    SheetNotFound(String),

    #[error("Invalid export path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a decoder capability (camera bridge, line reader, ...).
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("Scanner is already running")]
    AlreadyRunning,

    #[error("Scanner is not running")]
    NotRunning,

    #[error("Scanner worker panicked")]
    WorkerPanicked,

    #[error("Decoder reported: {0}")]
    External(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid debounce '{value}': expected milliseconds")]
    InvalidDebounce { value: String },

    #[error("Unknown payload schema '{0}' (expected dispatch, society or detect)")]
    UnknownSchema(String),
}
