use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// Which field layout a payload was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadVariant {
    /// Label-only payload (`Dispatch ID:.../Vehicle No:...`), stamped with a timestamp.
    Dispatch,
    /// Eight positional header segments followed by labelled segments.
    Society,
}

/// Schema selection for the parser. `Detect` inspects the first segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaChoice {
    Dispatch,
    Society,
    #[default]
    Detect,
}

impl FromStr for SchemaChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dispatch" | "a" => Ok(SchemaChoice::Dispatch),
            "society" | "b" => Ok(SchemaChoice::Society),
            "detect" | "auto" => Ok(SchemaChoice::Detect),
            other => Err(ConfigError::UnknownSchema(other.to_string())),
        }
    }
}

pub const DISPATCH_ID: &str = "dispatch_id";
pub const DISPATCH_DATE: &str = "dispatch_date";
pub const VEHICLE_NO: &str = "vehicle_no";
pub const TRUCK_SHEET_NO: &str = "truck_sheet_no";
pub const DELIVERY_CHALLAN_NO: &str = "delivery_challan_no";
pub const TOTAL_NET_QTY: &str = "total_net_qty";
pub const TOTAL_BAGS: &str = "total_bags";
pub const TIMESTAMP: &str = "timestamp";

/// Printed label → field key, variant A. Order is the column order.
const DISPATCH_LABELS: &[(&str, &str)] = &[
    ("Dispatch ID", DISPATCH_ID),
    ("Dispatch Date", DISPATCH_DATE),
    ("Vehicle No", VEHICLE_NO),
    ("Truck Sheet No", TRUCK_SHEET_NO),
    ("Delivery Challan No", DELIVERY_CHALLAN_NO),
    ("Total Net Qty", TOTAL_NET_QTY),
    ("Total Bags", TOTAL_BAGS),
];

/// Printed label → field key, variant B (no delivery challan).
const SOCIETY_LABELS: &[(&str, &str)] = &[
    ("Dispatch ID", DISPATCH_ID),
    ("Dispatch Date", DISPATCH_DATE),
    ("Truck Sheet No", TRUCK_SHEET_NO),
    ("Vehicle No", VEHICLE_NO),
    ("Total Net Qty", TOTAL_NET_QTY),
    ("Total Bags", TOTAL_BAGS),
];

/// Segment index → field key, variant B.
const SOCIETY_POSITIONAL: &[&str] = &[
    "agency",
    "federation",
    "society_name",
    "rrao",
    "exporter",
    "year",
    "season",
    "commodity",
];

impl PayloadVariant {
    pub fn labels(self) -> &'static [(&'static str, &'static str)] {
        match self {
            PayloadVariant::Dispatch => DISPATCH_LABELS,
            PayloadVariant::Society => SOCIETY_LABELS,
        }
    }

    pub fn positional_fields(self) -> &'static [&'static str] {
        match self {
            PayloadVariant::Dispatch => &[],
            PayloadVariant::Society => SOCIETY_POSITIONAL,
        }
    }

    pub fn is_timestamped(self) -> bool {
        matches!(self, PayloadVariant::Dispatch)
    }

    /// Every declared key, in column order.
    pub fn field_keys(self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.positional_fields().to_vec();
        keys.extend(self.labels().iter().map(|(_, key)| *key));
        if self.is_timestamped() {
            keys.push(TIMESTAMP);
        }
        keys
    }
}

/// True when `segment` begins with any label either variant knows.
pub fn starts_with_known_label(segment: &str) -> bool {
    DISPATCH_LABELS
        .iter()
        .chain(SOCIETY_LABELS)
        .any(|(label, _)| segment.starts_with(label))
}

impl SchemaChoice {
    /// Resolve the variant for a payload whose first trimmed segment is `first_segment`.
    pub fn resolve(self, first_segment: &str) -> PayloadVariant {
        match self {
            SchemaChoice::Dispatch => PayloadVariant::Dispatch,
            SchemaChoice::Society => PayloadVariant::Society,
            SchemaChoice::Detect => {
                let positional = !first_segment.is_empty()
                    && !first_segment.contains(':')
                    && !starts_with_known_label(first_segment);
                if positional {
                    PayloadVariant::Society
                } else {
                    PayloadVariant::Dispatch
                }
            }
        }
    }
}
