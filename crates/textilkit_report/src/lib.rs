//! `textilkit_report`:
//! Textile operations report run: configuration, dashboard data and the
//! extract -> assemble -> format -> save pipeline.
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use error::ReportError;
pub use pipeline::{
    SpecReportInputs, SpecReportOutcome, collect_report_inputs, run_report, run_with_mysql,
    write_report,
};
