use clap::Parser;

/// This is a program that turns county-level election results into a statewide summary.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration file describing the sources and the output.
    /// All the other options override the values of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in CSV format. If provided, elexsum will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') The location of the summary. Defaults to summary_results.csv.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The file containing the county results. Setting this option replaces
    /// the sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (URL, optional) Where to download the input from, if the input file does not exist yet.
    #[clap(long, value_parser)]
    pub url: Option<String>,

    /// (default 2) The number of decimal places of the percentages.
    #[clap(long, value_parser)]
    pub decimal_places: Option<u32>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
