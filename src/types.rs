use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::models::PayloadVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCell {
    pub column: String,
    pub value: String,
}

/// One parsed QR payload. Cells keep the declared column order of its variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRow {
    pub variant: PayloadVariant,
    pub cells: Vec<RowCell>,
}

impl ScanRow {
    /// Row with every declared key of `variant` present and empty.
    pub fn empty(variant: PayloadVariant) -> Self {
        let cells = variant
            .field_keys()
            .into_iter()
            .map(|key| RowCell {
                column: key.to_string(),
                value: String::new(),
            })
            .collect();
        Self { variant, cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.value.as_str())
    }

    /// Overwrite a declared column. Unknown columns are appended at the end.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self.cells.iter_mut().find(|c| c.column == column) {
            Some(cell) => cell.value = value,
            None => self.cells.push(RowCell {
                column: column.to_string(),
                value,
            }),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.column.as_str())
    }
}

/// Serialized as an ordered `{ column: value }` object.
impl Serialize for ScanRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for cell in &self.cells {
            map.serialize_entry(&cell.column, &cell.value)?;
        }
        map.end()
    }
}

/// Result of a single `ScanSession::ingest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Saved,
    Duplicate,
    Busy,
}

impl IngestStatus {
    pub fn message(self) -> &'static str {
        match self {
            IngestStatus::Saved => "Saved to Excel",
            IngestStatus::Duplicate => "Duplicate QR ignored",
            IngestStatus::Busy => "Scanner busy, scan skipped",
        }
    }
}

/// Counters shown to the user after every ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub count: usize,
    pub last_scan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IngestStatus>,
    pub message: String,
}
