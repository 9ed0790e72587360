use clap::Parser;

/// This is an attendance report program for purok kalihim.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the period in JSON format: period information, counters of each
    /// group and starting counts. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) A file with the counters of each group. Setting this option overrides the counters
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the cells of the report will be written in JSON format to the
    /// given location. If no other output is requested, the cells are printed to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the computed statistics of the period will be written in
    /// JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path or empty) If specified, the report is written as an Excel file (xlsx) to the given location.
    #[clap(long, value_parser)]
    pub xlsx: Option<String>,

    /// (file path or empty) An Excel file (xlsx) with the blank report. Its content is copied before
    /// filling the cells of the report.
    #[clap(short, long, value_parser)]
    pub template: Option<String>,

    /// (default: the only worksheet) When using a template, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// (file path or empty) A JSON file keeping the counts carried from one period to the next, for each
    /// purok. Missing starting counts are read from it, and the new counts are saved to it.
    #[clap(long, value_parser)]
    pub seed_store: Option<String>,

    /// The purok identifier used with the seed store. Defaults to the purok of the period information.
    #[clap(long, value_parser)]
    pub purok: Option<String>,

    /// (file path) A reference file containing the cells of a report in JSON format. If provided, kalihim
    /// will check that the computed cells match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
