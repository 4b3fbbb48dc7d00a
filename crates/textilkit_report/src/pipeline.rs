//! One report run: extract, assemble, format, save.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use textilkit_io_sql::{
    L_DASHBOARD_QUERIES, L_QUERY_CATALOG, MysqlSource, QueryExecutor, SpecConnectionOptions,
    SpecDataset, SpecExtractReport, extract_datasets, validate_catalog,
};
use textilkit_io_xlsx::{
    SpecDashboardData, SpecReportFormats, SpecXlsxReport, XlsxWriter, assemble_workbook,
    derive_report_file_name, format_workbook,
};

use crate::dashboard::fetch_dashboard_data;
use crate::error::ReportError;

/// File name timestamp format.
pub const C_FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Dashboard "Gerado em" timestamp format.
pub const C_GENERATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Everything read from the database for one run.
#[derive(Debug, Clone)]
pub struct SpecReportInputs {
    /// Catalog datasets, in catalog order (failed ones empty).
    pub datasets: Vec<SpecDataset>,
    /// Dashboard inputs.
    pub dashboard: SpecDashboardData,
    /// Extraction counts and errors.
    pub extract: SpecExtractReport,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SpecReportOutcome {
    /// Saved workbook.
    pub path_file_out: PathBuf,
    /// Sheet names, in workbook order.
    pub sheets: Vec<String>,
    /// Non-fatal warnings from assembly, formatting and writing.
    pub warnings: Vec<String>,
    /// Extraction counts and errors.
    pub extract: SpecExtractReport,
}

/// Validate both query catalogs.
pub fn validate_report_catalogs() -> Result<(), ReportError> {
    validate_catalog(&L_QUERY_CATALOG).map_err(ReportError::Catalog)?;
    validate_catalog(&L_DASHBOARD_QUERIES).map_err(ReportError::Catalog)?;
    Ok(())
}

/// Run the catalog and the dashboard queries. Query failures never abort.
pub fn collect_report_inputs<E>(executor: &mut E, now: DateTime<Local>) -> SpecReportInputs
where
    E: QueryExecutor + ?Sized,
{
    tracing::info!("extracting datasets");
    let (datasets, extract) = extract_datasets(executor, &L_QUERY_CATALOG);
    tracing::info!(
        queries = extract.n_queries,
        failed = extract.n_failed,
        empty = extract.n_empty,
        "{} datasets extracted",
        extract.n_queries
    );

    tracing::info!("collecting dashboard data");
    let dashboard =
        fetch_dashboard_data(executor, &now.format(C_GENERATED_AT_FORMAT).to_string());

    SpecReportInputs {
        datasets,
        dashboard,
        extract,
    }
}

/// Assemble, format and save the workbook into `output_dir`.
pub fn write_report(
    inputs: &SpecReportInputs,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<SpecReportOutcome, ReportError> {
    fs::create_dir_all(output_dir).map_err(|err| {
        ReportError::Save(format!("cannot create {}: {err}", output_dir.display()))
    })?;
    let path_file_out = output_dir.join(derive_report_file_name(
        &now.format(C_FILE_STAMP_FORMAT).to_string(),
    ));

    let mut report = SpecXlsxReport::default();
    let mut workbook = assemble_workbook(
        &inputs.dashboard,
        inputs
            .datasets
            .iter()
            .map(|dataset| (dataset.name.as_str(), &dataset.frame)),
        &mut report,
    );
    format_workbook(&mut workbook, &SpecReportFormats::default(), &mut report);

    let mut writer = XlsxWriter::new(path_file_out.clone());
    writer.write_workbook(&workbook).map_err(ReportError::Save)?;
    writer.close().map_err(ReportError::Save)?;
    report.warnings.extend(writer.report().warnings);

    Ok(SpecReportOutcome {
        path_file_out,
        sheets: report.sheets,
        warnings: report.warnings,
        extract: inputs.extract.clone(),
    })
}

/// Full run against any executor.
pub fn run_report<E>(
    executor: &mut E,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<SpecReportOutcome, ReportError>
where
    E: QueryExecutor + ?Sized,
{
    validate_report_catalogs()?;
    let inputs = collect_report_inputs(executor, now);
    write_report(&inputs, output_dir, now)
}

/// Full run against MySQL. The connection is closed before the workbook is written.
pub fn run_with_mysql(
    options: &SpecConnectionOptions,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<SpecReportOutcome, ReportError> {
    validate_report_catalogs()?;
    let mut source = MysqlSource::connect(options).map_err(ReportError::Connect)?;
    let inputs = collect_report_inputs(&mut source, now);
    source.close();
    write_report(&inputs, output_dir, now)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_validate_report_catalogs() {
        validate_report_catalogs().expect("catalogs");
    }

    #[test]
    fn test_write_report_names_file_from_timestamp() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let now = Local
            .with_ymd_and_hms(2026, 10, 19, 8, 30, 5)
            .single()
            .expect("timestamp");
        let inputs = SpecReportInputs {
            datasets: Vec::new(),
            dashboard: SpecDashboardData::default(),
            extract: SpecExtractReport::default(),
        };

        let outcome = write_report(&inputs, &dir_tmp.path().join("saida"), now).expect("write");

        assert_eq!(
            outcome.path_file_out.file_name().and_then(|name| name.to_str()),
            Some("relatorio_textil_20261019_083005.xlsx")
        );
        assert!(outcome.path_file_out.is_file());
        assert_eq!(outcome.sheets, vec!["Dashboard"]);
    }

    #[test]
    fn test_run_with_mysql_refused_connection_is_fatal_and_writes_nothing() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let options = SpecConnectionOptions {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "relatorio".to_string(),
            database: "industria_textil".to_string(),
            ..Default::default()
        };

        let result = run_with_mysql(&options, dir_tmp.path(), Local::now());

        let err = result.expect_err("connection must fail");
        assert!(matches!(err, ReportError::Connect(_)), "{err:?}");
        assert_eq!(err.exit_code(), 3);
        let n_entries = std::fs::read_dir(dir_tmp.path()).expect("read dir").count();
        assert_eq!(n_entries, 0);
    }
}
