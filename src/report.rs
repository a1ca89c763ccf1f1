use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use statewide_tally::*;

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_fetch;
mod io_output;
pub mod normalize;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display(
        "The Excel file {path} has several worksheets, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Line {lineno}: cannot read the cell {content} (dates must be stored as text)"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Missing parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno} is too short"))]
    LineTooShort { lineno: usize },
    #[snafu(display("Cannot find the column {column} in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno}: malformed vote count {content:?}"))]
    MalformedVoteCount { lineno: usize, content: String },
    #[snafu(display("Line {lineno}: candidate {content:?} is not of the form 'Last, First'"))]
    MalformedCandidateName { lineno: usize, content: String },
    #[snafu(display("Line {lineno}: cannot find a district number in office {content:?}"))]
    MalformedDistrict { lineno: usize, content: String },
    #[snafu(display("Unknown input type {input_type:?} (expected csv or xlsx)"))]
    UnknownInputType { input_type: String },
    #[snafu(display("No source of results: use --input or --config"))]
    NoSource {},
    #[snafu(display("Error downloading {url}"))]
    Fetching { source: reqwest::Error, url: String },
    #[snafu(display("Error tabulating the results"))]
    Tally { source: TallyErrors },
    #[snafu(display("Error serializing the summary"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error flushing the summary"))]
    FlushingSummary { source: std::io::Error },
    #[snafu(display("The summary is not valid UTF-8"))]
    SummaryEncoding { source: std::string::FromUtf8Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type ReportResult<T> = Result<T, ReportError>;
pub type BReportResult<T> = Result<T, Box<ReportError>>;

const DEFAULT_OUTPUT: &str = "summary_results.csv";
const DEFAULT_INPUT_TYPE: &str = "csv";
const DEFAULT_MARKER: &str = "X";

/// A row as read from a source, before any cleaning.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRow {
    /// Line in the source file, starting at 1 with the header.
    pub lineno: usize,
    pub date: String,
    pub office: String,
    pub candidate: String,
    pub party: String,
    pub votes: String,
}

// The settings of one run, once the command line and the configuration file
// have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RunSettings {
    sources: Vec<FileSource>,
    output: String,
    marker: String,
    rules: TallyRules,
}

fn build_settings(args: &Args) -> BReportResult<RunSettings> {
    let config: ReportConfig = match &args.config {
        Some(path) => read_config(path)?,
        None => ReportConfig::default(),
    };
    debug!("build_settings: config: {:?}", config);

    let sources = match &args.input {
        Some(input) => vec![FileSource {
            provider: args
                .input_type
                .clone()
                .unwrap_or_else(|| DEFAULT_INPUT_TYPE.to_string()),
            file_path: input.clone(),
            url: args.url.clone(),
            excel_worksheet_name: args.excel_worksheet_name.clone(),
        }],
        None => config.result_file_sources.clone(),
    };
    ensure!(!sources.is_empty(), NoSourceSnafu {});

    let output_settings = config.output_settings.unwrap_or_default();
    let rules = TallyRules {
        decimal_places: args
            .decimal_places
            .or(output_settings.decimal_places)
            .unwrap_or(TallyRules::DEFAULT_RULES.decimal_places),
    };
    Ok(RunSettings {
        sources,
        output: args
            .out
            .clone()
            .or(output_settings.output_file)
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
        marker: output_settings
            .marker_label
            .unwrap_or_else(|| DEFAULT_MARKER.to_string()),
        rules,
    })
}

fn read_source(cfs: &FileSource) -> BReportResult<Vec<RawRow>> {
    if let Some(url) = &cfs.url {
        io_fetch::ensure_local_copy(Path::new(&cfs.file_path), url)?;
    }
    info!("Attempting to read results file {:?}", cfs.file_path);
    let rows = match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_results(&cfs.file_path)?,
        "xlsx" | "excel" => {
            io_excel::read_excel_results(&cfs.file_path, cfs.excel_worksheet_name.as_deref())?
        }
        x => {
            return Err(Box::new(ReportError::UnknownInputType {
                input_type: x.to_string(),
            }))
        }
    };
    info!("Read {} rows from {:?}", rows.len(), cfs.file_path);
    Ok(rows)
}

fn check_reference(summary: &str, reference_path: &str) -> BReportResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningFileSnafu {
        path: reference_path,
    })?;
    // Line endings and trailing whitespace are not significant.
    let canonical = |s: &str| -> String {
        s.lines()
            .map(|l| l.trim_end())
            .collect::<Vec<&str>>()
            .join("\n")
    };
    let reference_c = canonical(&reference);
    let summary_c = canonical(summary);
    if reference_c != summary_c {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(reference_c.as_str(), summary_c.as_str(), "\n");
        return Err(Box::new(ReportError::ReferenceMismatch {}));
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

/// Reads all the sources, computes the statewide summary and writes it.
///
/// Nothing is written if any step fails.
pub fn run_election_summary(args: &Args) -> BReportResult<()> {
    let settings = build_settings(args)?;
    info!("settings: {:?}", settings);

    let mut raw_rows: Vec<RawRow> = Vec::new();
    for cfs in settings.sources.iter() {
        let mut file_rows = read_source(cfs)?;
        raw_rows.append(&mut file_rows);
    }

    let rows = normalize::normalize_rows(&raw_rows)?;
    let summaries = run_statewide_tally(rows, &settings.rules).context(TallySnafu {})?;
    let summary_csv = io_output::format_summary_csv(&summaries, &settings.marker)?;

    if let Some(reference_path) = &args.reference {
        check_reference(&summary_csv, reference_path)?;
    }

    io_output::write_summary(&summary_csv, &settings.output)?;
    Ok(())
}

/// Resolves a path found in a configuration file against the directory of that file.
pub fn resolve_path(root: &Path, path: &str) -> String {
    let p: PathBuf = [root, Path::new(path)].iter().collect();
    p.as_path().display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> String {
        option_env!("ELEXSUM_TEST_DIR")
            .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata"))
            .to_string()
    }

    fn empty_args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: None,
            input_type: None,
            url: None,
            decimal_places: None,
            excel_worksheet_name: None,
            verbose: false,
        }
    }

    fn run_summary_test(test_name: &str) -> BReportResult<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        info!("Running test {}", test_name);
        let args = Args {
            config: Some(format!(
                "{}/{}/{}_config.json",
                test_dir(),
                test_name,
                test_name
            )),
            reference: Some(format!(
                "{}/{}/{}_expected_summary.csv",
                test_dir(),
                test_name,
                test_name
            )),
            ..empty_args()
        };
        run_election_summary(&args)
    }

    fn test_wrapper(test_name: &str) {
        if let Err(e) = run_summary_test(test_name) {
            panic!("test {} failed: {}: {:?}", test_name, e, e);
        }
    }

    // Runs an input that must fail, and checks that no summary was written.
    fn failing_input(test_name: &str, input_file: &str, input_type: &str) -> Box<ReportError> {
        let _ = env_logger::builder().is_test(true).try_init();
        let out = std::env::temp_dir().join(format!("elexsum_{}_{}", test_name, input_file));
        let _ = fs::remove_file(&out);
        let args = Args {
            input: Some(format!("{}/{}/{}", test_dir(), test_name, input_file)),
            input_type: Some(input_type.to_string()),
            out: Some(out.display().to_string()),
            ..empty_args()
        };
        let res = run_election_summary(&args);
        assert!(!out.exists(), "a summary was written for {}", test_name);
        match res {
            Err(e) => e,
            Ok(()) => panic!("test {} should have failed", test_name),
        }
    }

    #[test]
    fn fake_va_results() {
        test_wrapper("fake_va_results");
    }

    #[test]
    fn tie_and_unopposed() {
        test_wrapper("tie_and_unopposed");
    }

    #[test]
    fn multi_source_one_decimal() {
        test_wrapper("multi_source_one_decimal");
    }

    #[test]
    fn excel_single_sheet() {
        test_wrapper("excel_single_sheet");
    }

    #[test]
    fn excel_named_sheet() {
        test_wrapper("excel_named_sheet");
    }

    #[test]
    fn excel_without_worksheet_name_fails() {
        let e = failing_input(
            "excel_named_sheet",
            "excel_named_sheet_results.xlsx",
            "xlsx",
        );
        assert!(matches!(*e, ReportError::AmbiguousWorksheet { .. }));
    }

    #[test]
    fn reference_mismatch_fails() {
        let res = run_summary_test("reference_mismatch");
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::ReferenceMismatch {})
        ));
    }

    #[test]
    fn malformed_votes_fail() {
        let e = failing_input("failures", "malformed_votes.csv", "csv");
        assert!(matches!(
            *e,
            ReportError::MalformedVoteCount { lineno: 4, .. }
        ));
    }

    #[test]
    fn zero_vote_race_fails() {
        let e = failing_input("failures", "zero_votes.csv", "csv");
        assert!(matches!(
            *e,
            ReportError::Tally {
                source: TallyErrors::ZeroVoteRace(_)
            }
        ));
    }

    #[test]
    fn missing_column_fails() {
        let e = failing_input("failures", "missing_column.csv", "csv");
        assert!(matches!(*e, ReportError::MissingColumn { .. }));
    }

    #[test]
    fn command_line_overrides_config() {
        let args = Args {
            config: Some(format!(
                "{}/multi_source_one_decimal/multi_source_one_decimal_config.json",
                test_dir()
            )),
            input: Some("results.xlsx".to_string()),
            input_type: Some("xlsx".to_string()),
            decimal_places: Some(3),
            out: Some("stdout".to_string()),
            ..empty_args()
        };
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.sources.len(), 1);
        assert_eq!(settings.sources[0].provider, "xlsx");
        assert_eq!(settings.sources[0].file_path, "results.xlsx");
        assert_eq!(settings.rules.decimal_places, 3);
        assert_eq!(settings.output, "stdout");
        assert_eq!(settings.marker, "*");
    }

    #[test]
    fn defaults_without_config() {
        let args = Args {
            input: Some("results.csv".to_string()),
            ..empty_args()
        };
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.sources[0].provider, "csv");
        assert_eq!(settings.rules, TallyRules::DEFAULT_RULES);
        assert_eq!(settings.output, "summary_results.csv");
        assert_eq!(settings.marker, "X");
    }

    #[test]
    fn no_source_fails() {
        let res = build_settings(&empty_args());
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::NoSource {})
        ));
    }
}
