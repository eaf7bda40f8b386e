pub mod payload_schema;

pub use payload_schema::{PayloadVariant, SchemaChoice};
