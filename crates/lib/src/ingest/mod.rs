//! # Ingestion Pipeline
//!
//! This module turns a raw patent export into the immutable tables the query and
//! analytics engines read: the schema loader parses the two-tier header, the
//! normalizer derives dates and firm identities, and the classification
//! expander builds the fact table.

pub mod classification;
pub mod normalize;
pub mod schema;

pub use classification::{clean_codes, expand_classifications};
pub use normalize::{month_name, month_start, normalize_firm, normalize_table, parse_date};
pub use schema::{read_source_bytes, read_table, read_table_from_path, RawTable};
