// src/source/mod.rs
// =============================================================================
// This module produces the list of records to check.
//
// Submodules:
// - table: Pulls records out of the first table of an HTML page
// - records: Reads/writes the same records as a CSV file
// =============================================================================

mod records;
mod table;

pub use records::{read_records_csv, write_records_csv};
pub use table::extract_table_records;
