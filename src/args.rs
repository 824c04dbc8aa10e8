use clap::Parser;

/// Turns the answers of a motivation survey into chart data.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file: input file, titles, answer labels, colors and synonyms.
    /// For more information about the file format, read the manual of the likert_tally crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected chart data in JSON format. If provided, likertchart will
    /// check that the output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey and the chart data will be written in
    /// JSON format to the given location. Setting this option overrides the path that may be specified with the
    /// --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The survey file to read. Setting this option overrides the path that may be specified with the
    /// --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv, excel or empty) The type of the input. By default it is deduced from the extension of the file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (bar or pie, can be repeated) The charts to produce, in order. The survey is read only once.
    #[clap(long, value_parser)]
    pub view: Vec<String>,

    /// (text or json, default text) How the charts are printed on the standard output.
    #[clap(long, value_parser)]
    pub format: Option<String>,

    /// (default ',') The field separator of CSV files. Use 'tab' for tab-separated files.
    #[clap(long, value_parser)]
    pub delimiter: Option<String>,

    /// (default: the first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
