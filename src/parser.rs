//! QR payload field extraction.
//!
//! Payloads are `/`-separated segments. Labelled segments look like
//! `Dispatch ID: 123`; society payloads additionally lead with eight bare
//! header segments read by position.

use crate::models::{PayloadVariant, SchemaChoice};
use crate::types::ScanRow;

const SEGMENT_DELIMITER: char = '/';
const LABEL_DELIMITER: char = ':';

fn segments(raw: &str) -> Vec<&str> {
    raw.split(SEGMENT_DELIMITER).map(str::trim).collect()
}

/// Value after the first colon, trimmed. Empty when the segment has no colon.
fn label_value(segment: &str) -> &str {
    segment
        .split_once(LABEL_DELIMITER)
        .map(|(_, value)| value.trim())
        .unwrap_or("")
}

fn extract(parts: &[&str], variant: PayloadVariant) -> ScanRow {
    let mut row = ScanRow::empty(variant);

    for (idx, key) in variant.positional_fields().iter().enumerate() {
        if let Some(segment) = parts.get(idx) {
            row.set(key, *segment);
        }
    }

    // Sequential overwrite: the last segment carrying a label wins.
    for segment in parts {
        for (label, key) in variant.labels() {
            if segment.starts_with(*label) {
                row.set(key, label_value(segment));
            }
        }
    }

    row
}

/// Parse `raw` with the given schema choice. Never fails; unknown input yields empty values.
pub fn parse_payload(raw: &str, schema: SchemaChoice) -> ScanRow {
    let parts = segments(raw);
    let first = parts.first().copied().unwrap_or("");
    extract(&parts, schema.resolve(first))
}

pub fn parse_dispatch(raw: &str) -> ScanRow {
    extract(&segments(raw), PayloadVariant::Dispatch)
}

pub fn parse_society(raw: &str) -> ScanRow {
    extract(&segments(raw), PayloadVariant::Society)
}
