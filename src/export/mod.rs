//! Export adapters: CSV tables and the document summary
//!
//! These only format engine output; business rules such as break-even
//! detection are always taken from the summary module.

mod csv_export;
pub mod report;

pub use csv_export::{read_financials, records_to_csv, write_records, CsvLayout, FinancialRow};
