//! `textilkit_io_sql`:
//! Data source kernel for the textile operations report.
//!
//! - `spec`     : values, tables, connection options, errors, report
//! - `catalog`  : closed query catalog and its validation
//! - `encoding` : repair of mis-decoded text
//! - `frame`    : raw tables into typed polars frames
//! - `source`   : executor seam, MySQL binding, catalog extraction
pub mod catalog;
pub mod encoding;
pub mod frame;
pub mod source;
pub mod spec;

pub use catalog::{L_DASHBOARD_QUERIES, L_QUERY_CATALOG, SpecQuery, validate_catalog};
pub use encoding::repair_mojibake;
pub use frame::{derive_dataset_frame, validate_table_schema};
pub use source::{MysqlSource, QueryExecutor, extract_datasets, fetch_dataset_frame};
pub use spec::{
    EnumSqlKind, EnumSqlValue, SourceError, SpecConnectionOptions, SpecDataset, SpecExtractReport,
    SpecRawTable,
};
