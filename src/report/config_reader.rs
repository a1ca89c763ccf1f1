use crate::report::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// A file path, or `stdout`.
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "decimalPlaces")]
    pub decimal_places: Option<u32>,
    /// The marker written in the `winner` and `tie_race` columns.
    #[serde(rename = "markerLabel")]
    pub marker_label: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// `csv` or `xlsx`
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Where to download the file from when it is not present locally.
    pub url: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "resultFileSources", default)]
    pub result_file_sources: Vec<FileSource>,
}

/// Reads a configuration file.
///
/// The paths it contains are resolved against the directory of the file.
pub fn read_config(path: &str) -> BReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let mut config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!("config: {:?}", config);

    let root = Path::new(path)
        .parent()
        .context(MissingParentDirSnafu { path })?;
    for cfs in config.result_file_sources.iter_mut() {
        cfs.file_path = resolve_path(root, &cfs.file_path);
    }
    if let Some(os) = config.output_settings.as_mut() {
        os.output_file = os.output_file.as_ref().map(|out| match out.as_str() {
            "stdout" => out.clone(),
            _ => resolve_path(root, out),
        });
    }
    debug!("read_config: resolved config: {:?}", config);
    Ok(config)
}
