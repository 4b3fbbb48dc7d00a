//! Command line interface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(name = "textil-report")]
#[command(about = "Textile operations report: MySQL aggregates into a formatted XLSX workbook", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file, without or with extension (default: config/database)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the workbook is written to (overrides `report.output_dir`)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
