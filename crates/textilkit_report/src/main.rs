use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use textilkit_report::cli::Cli;
use textilkit_report::config::load_report_config;
use textilkit_report::logging::init_logging;
use textilkit_report::{ReportError, SpecReportOutcome, run_with_mysql};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("{}", "=".repeat(60));
    println!("🧵 RELATÓRIO TÊXTIL");
    println!("{}", "=".repeat(60));

    match run(&cli) {
        Ok(outcome) => {
            print_summary(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let n_code = err
                .downcast_ref::<ReportError>()
                .map_or(1, ReportError::exit_code);
            tracing::error!("{err:#}");
            eprintln!("❌ {err:#}");
            ExitCode::from(n_code)
        }
    }
}

fn run(cli: &Cli) -> Result<SpecReportOutcome> {
    let cfg_report = load_report_config(cli.config.as_deref())?;
    let path_output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| cfg_report.report.output_dir.clone());

    let outcome = run_with_mysql(
        &cfg_report.database.to_connection_options(),
        &path_output_dir,
        chrono::Local::now(),
    )?;
    Ok(outcome)
}

fn print_summary(outcome: &SpecReportOutcome) {
    let extract = &outcome.extract;
    println!(
        "✅ {} conjuntos de dados extraídos ({} com dados, {} vazios, {} com erro)",
        extract.n_queries,
        extract.n_filled(),
        extract.n_empty,
        extract.n_failed
    );
    for (c_name, c_err) in &extract.errors {
        println!("   ⚠️  {c_name}: {c_err}");
    }
    for c_warning in &outcome.warnings {
        println!("   ⚠️  {c_warning}");
    }
    println!("📑 Abas: {}", outcome.sheets.join(", "));
    println!("💾 Relatório Excel salvo: {}", outcome.path_file_out.display());
    println!("{}", "=".repeat(60));
}
