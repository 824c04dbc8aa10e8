use log::{debug, info, warn};

use likert_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod render;

use crate::survey::config_reader::*;
use crate::survey::io_common::{detect_provider, simplify_file_name, Provider};
use crate::survey::render::*;

/// Everything that can go wrong between picking a file and drawing a chart.
///
/// The display message is meant for the end user. The debug representation
/// keeps the full details (paths, lines, cells).
#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display(
        "Unsupported file format {format:?}. Please select a CSV or Excel (.xlsx, .xls) file."
    ))]
    UnsupportedFormat { format: String },
    #[snafu(display("Error processing the file, please check the file format: {reason}"))]
    MalformedInput { reason: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Cannot find the worksheet {name:?} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvParse { source: csv::Error, lineno: u64 },
    #[snafu(display("Cannot build the chart: {source}"))]
    Tally { source: TallyErrors },
    #[snafu(display("Could not draw the {view} chart"))]
    RenderFailure {
        source: std::io::Error,
        view: String,
    },
    #[snafu(display("No survey has been loaded yet, please select a file first"))]
    NoSurveyLoaded {},
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the chart data and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The tally of one survey file, ready to be charted in any view.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tabulation {
    pub name: String,
    pub headers: Vec<String>,
    pub result: AggregateResult,
}

/// Validates and tallies a table.
///
/// This is the synchronous part of the pipeline: it does not touch any file.
pub fn tabulate(name: &str, table: Table, vocabulary: &Vocabulary) -> SurveyResult<Tabulation> {
    let table = validate(table, vocabulary).context(TallySnafu {})?;
    let result = aggregate(&table, vocabulary).context(TallySnafu {})?;
    Ok(Tabulation {
        name: name.to_string(),
        headers: table.headers,
        result,
    })
}

/// Reads a survey file into a table, with the reader matching its format.
pub fn read_table(path: &str, cfs: &FileSource) -> SurveyResult<Table> {
    let provider = detect_provider(path, cfs.provider.as_deref())?;
    info!("Attempting to read survey file {:?} as {:?}", path, provider);
    let table = match provider {
        Provider::Csv => io_csv::read_csv_table(path, cfs),
        Provider::Excel => io_excel::read_excel_table(path, cfs),
    }?;
    info!(
        "Read {} questions and {} rows from {:?}",
        table.headers.len(),
        table.rows.len(),
        path
    );
    Ok(table)
}

/// The state shared between loading a file and switching the chart type.
///
/// Only the last successful load is kept. Loading a file replaces it as a
/// whole once the file has been completely processed: a failed load leaves the
/// previous survey in place, and a view change never sees a partial result.
pub struct Session {
    vocabulary: Vocabulary,
    options: ChartOptions,
    last: Option<Tabulation>,
}

impl Session {
    pub fn new(vocabulary: Vocabulary, options: ChartOptions) -> Session {
        Session {
            vocabulary,
            options,
            last: None,
        }
    }

    /// Reads, tallies and charts a survey file.
    pub fn load_file(
        &mut self,
        path: &str,
        cfs: &FileSource,
        view: ChartView,
    ) -> SurveyResult<Projection> {
        let table = read_table(path, cfs)?;
        self.load_table(&simplify_file_name(path), table, view)
    }

    /// Tallies and charts a table that was already read.
    pub fn load_table(
        &mut self,
        name: &str,
        table: Table,
        view: ChartView,
    ) -> SurveyResult<Projection> {
        let tabulation = tabulate(name, table, &self.vocabulary)?;
        let projection = self.project(&tabulation, view)?;
        self.last = Some(tabulation);
        Ok(projection)
    }

    /// Charts the last loaded survey in another view, without reading the file again.
    pub fn change_view(&self, view: ChartView) -> SurveyResult<Projection> {
        let tabulation = self.last.as_ref().context(NoSurveyLoadedSnafu {})?;
        debug!(
            "change_view: {} chart for {:?}",
            view.name(),
            tabulation.name
        );
        self.project(tabulation, view)
    }

    pub fn last_loaded(&self) -> Option<&Tabulation> {
        self.last.as_ref()
    }

    fn project(&self, tabulation: &Tabulation, view: ChartView) -> SurveyResult<Projection> {
        project(
            &tabulation.headers,
            &tabulation.result,
            view,
            &self.vocabulary,
            &self.options,
        )
        .context(TallySnafu {})
    }
}

/// Runs the command line program: reads the survey and renders the requested charts.
pub fn run_survey(args: &Args) -> SurveyResult<()> {
    let (config, config_dir) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let dir = Path::new(config_path)
                .parent()
                .map(|p| p.display().to_string());
            (config, dir)
        }
        None => (SurveyConfig::default(), None),
    };

    let cfs = merge_file_source(&config.file_source, args);
    let input_path = match (&args.input, &cfs.file_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(config_dir.as_deref(), p),
        (None, None) => {
            whatever!("No input file provided. Use --input or set fileSource.filePath in the configuration file.")
        }
    };

    let vocabulary = build_vocabulary(&config.categories)?;
    let options = build_chart_options(&config.output_settings);

    let view_names: Vec<String> = if !args.view.is_empty() {
        args.view.clone()
    } else if let Some(v) = &config.default_view {
        vec![v.clone()]
    } else {
        vec![ChartView::Bar.name().to_string()]
    };
    let views: Vec<ChartView> = view_names
        .iter()
        .map(|s| ChartView::from_str(s).context(TallySnafu {}))
        .collect::<SurveyResult<Vec<ChartView>>>()?;

    let mut renderer: Box<dyn ChartRenderer> = match args.format.as_deref() {
        None | Some("text") => Box::new(TextRenderer::new(std::io::stdout())),
        Some("json") => Box::new(JsonRenderer::new(std::io::stdout())),
        Some(x) => whatever!("Unknown output format {:?} (expected text or json)", x),
    };

    let mut session = Session::new(vocabulary, options);
    let mut charts: Vec<JSValue> = Vec::new();
    for (idx, view) in views.iter().enumerate() {
        let projection = if idx == 0 {
            session.load_file(&input_path, &cfs, *view)?
        } else {
            session.change_view(*view)?
        };
        match projection {
            Projection::Chart(spec) => {
                renderer.render(&spec)?;
                charts.push(chart_spec_to_json(&spec));
            }
            Projection::NoData => {
                warn!("No answer to display in the {} chart, skipping it", view.name());
            }
        }
    }

    let tabulation = session
        .last_loaded()
        .context(NoSurveyLoadedSnafu {})?;
    let summary_js = build_summary_js(tabulation, &charts);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    let out_path = args
        .out
        .clone()
        .or_else(|| config.output_settings.output_path.clone());
    match out_path.as_deref() {
        None => {}
        Some("stdout") => {
            println!("{}", pretty_js_summary);
        }
        Some(p) => {
            let path = if args.out.is_some() {
                p.to_string()
            } else {
                resolve_path(config_dir.as_deref(), p)
            };
            info!("Writing the chart data to {:?}", path);
            let mut file = fs::File::create(&path).context(WritingOutputSnafu { path: path.clone() })?;
            writeln!(file, "{}", pretty_js_summary).context(WritingOutputSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let reference_js = read_reference(reference_path)?;
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
        if pretty_js_reference != pretty_js_summary {
            warn!("Found differences with the reference file");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_summary.as_str(),
                "\n",
            );
            return ReferenceMismatchSnafu {
                path: reference_path.clone(),
            }
            .fail();
        }
        info!("The chart data matches the reference {:?}", reference_path);
    }

    Ok(())
}

// Command line flags take precedence over the configuration file.
fn merge_file_source(cfs: &FileSource, args: &Args) -> FileSource {
    FileSource {
        provider: args.input_type.clone().or_else(|| cfs.provider.clone()),
        file_path: cfs.file_path.clone(),
        delimiter: args.delimiter.clone().or_else(|| cfs.delimiter.clone()),
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| cfs.excel_worksheet_name.clone()),
    }
}

fn resolve_path(root: Option<&str>, path: &str) -> String {
    match root {
        Some(r) if !r.is_empty() && Path::new(path).is_relative() => {
            Path::new(r).join(path).display().to_string()
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::io_csv::parse_delimited;
    use super::*;

    const SCENARIO: &str =
        "Q1,Q2\nHighly motivating,Not motivating\nModerately motivating,Highly motivating\n";

    fn session() -> Session {
        Session::new(Vocabulary::motivation(), ChartOptions::default())
    }

    #[test]
    fn tabulate_two_questions() {
        let table = parse_delimited(SCENARIO, b',').unwrap();
        let tab = tabulate("scenario.csv", table, &Vocabulary::motivation()).unwrap();
        assert_eq!(tab.headers, vec!["Q1", "Q2"]);
        assert_eq!(
            tab.result.questions,
            vec![
                QuestionCounts::from([1, 1, 0, 0]),
                QuestionCounts::from([1, 0, 0, 1])
            ]
        );
    }

    #[test]
    fn tabulate_unknown_vocabulary() {
        let table = parse_delimited("Name,City\nAnna,Paris\n", b',').unwrap();
        let err = tabulate("people.csv", table, &Vocabulary::motivation()).unwrap_err();
        assert!(matches!(
            err,
            SurveyError::Tally {
                source: TallyErrors::NoRecognizedAnswers { .. }
            }
        ));
    }

    #[test]
    fn change_view_reuses_the_last_survey() {
        let mut s = session();
        let table = parse_delimited(SCENARIO, b',').unwrap();
        let bar = s.load_table("scenario.csv", table, ChartView::Bar).unwrap();
        match bar {
            Projection::Chart(spec) => {
                assert_eq!(spec.series.len(), 4);
                assert!(spec.series.iter().all(|x| x.data.len() == 2));
            }
            Projection::NoData => panic!("expected a bar chart"),
        }
        match s.change_view(ChartView::Pie).unwrap() {
            Projection::Chart(spec) => {
                assert_eq!(spec.series[0].data, vec![2, 1, 0, 1]);
                assert_eq!(spec.total(), s.last_loaded().unwrap().result.total());
            }
            Projection::NoData => panic!("expected a pie chart"),
        }
    }

    #[test]
    fn change_view_without_survey() {
        let s = session();
        assert!(matches!(
            s.change_view(ChartView::Pie),
            Err(SurveyError::NoSurveyLoaded {})
        ));
    }

    #[test]
    fn failed_load_keeps_the_previous_survey() {
        let mut s = session();
        let table = parse_delimited(SCENARIO, b',').unwrap();
        s.load_table("first.csv", table, ChartView::Bar).unwrap();
        let bad = parse_delimited("Q1\nnothing useful\n", b',').unwrap();
        assert!(s.load_table("second.csv", bad, ChartView::Bar).is_err());
        assert_eq!(s.last_loaded().unwrap().name, "first.csv");

        let other = parse_delimited("Q9\nhigh\nlow\n", b',').unwrap();
        s.load_table("third.csv", other, ChartView::Pie).unwrap();
        let last = s.last_loaded().unwrap();
        assert_eq!(last.name, "third.csv");
        assert_eq!(last.headers, vec!["Q9"]);
    }

    #[test]
    fn unsupported_file_is_rejected_before_reading() {
        let mut s = session();
        let res = s.load_file(
            "/this/file/does/not/exist.pdf",
            &FileSource::default(),
            ChartView::Bar,
        );
        assert!(matches!(res, Err(SurveyError::UnsupportedFormat { .. })));
    }

    #[test]
    fn missing_csv_file() {
        let mut s = session();
        let res = s.load_file(
            "/this/file/does/not/exist.csv",
            &FileSource::default(),
            ChartView::Bar,
        );
        assert!(matches!(res, Err(SurveyError::OpeningFile { .. })));
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir =
            std::env::temp_dir().join(format!("likertchart-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn default_args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: None,
            input_type: None,
            view: vec![],
            format: None,
            delimiter: None,
            excel_worksheet_name: None,
            verbose: false,
        }
    }

    // A survey file and a configuration next to it, with relative paths.
    fn write_survey(dir: &Path) -> String {
        fs::write(dir.join("answers.csv"), SCENARIO).unwrap();
        let config = r##"{
            "outputSettings": { "outputPath": "summary.json" },
            "fileSource": { "filePath": "answers.csv" }
        }"##;
        let config_path = dir.join("survey.json");
        fs::write(&config_path, config).unwrap();
        config_path.display().to_string()
    }

    fn read_js(path: &Path) -> JSValue {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn load_file_reads_a_csv_file() {
        let dir = scratch_dir("load");
        let path = dir.join("answers.csv");
        fs::write(&path, SCENARIO).unwrap();
        let mut s = session();
        let path = path.display().to_string();
        match s.load_file(&path, &FileSource::default(), ChartView::Pie).unwrap() {
            Projection::Chart(spec) => assert_eq!(spec.series[0].data, vec![2, 1, 0, 1]),
            Projection::NoData => panic!("expected a pie chart"),
        }
        assert_eq!(s.last_loaded().unwrap().name, "answers.csv");
    }

    #[test]
    fn run_with_config_and_two_views() {
        let dir = scratch_dir("views");
        let mut args = default_args();
        args.config = Some(write_survey(&dir));
        args.view = vec!["bar".to_string(), "pie".to_string()];
        args.format = Some("json".to_string());
        run_survey(&args).unwrap();

        // The output path of the configuration is relative to it.
        let js = read_js(&dir.join("summary.json"));
        assert_eq!(js["source"], "answers.csv");
        assert_eq!(js["respondents"], 2);
        assert_eq!(js["charts"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(js["charts"][0]["type"], "bar");
        assert_eq!(js["charts"][0]["labels"], serde_json::json!(["Q1", "Q2"]));
        assert_eq!(js["charts"][1]["type"], "pie");
        assert_eq!(
            js["charts"][1]["datasets"][0]["data"],
            serde_json::json!([2, 1, 0, 1])
        );
    }

    #[test]
    fn run_with_flags_only() {
        let dir = scratch_dir("flags");
        let input = dir.join("answers.csv");
        fs::write(&input, "Q1;Q2\nhigh;low\n").unwrap();
        let out = dir.join("out.json");
        let mut args = default_args();
        args.input = Some(input.display().to_string());
        args.delimiter = Some(";".to_string());
        args.out = Some(out.display().to_string());
        run_survey(&args).unwrap();

        let js = read_js(&out);
        assert_eq!(js["charts"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(js["charts"][0]["type"], "bar");
        assert_eq!(js["questions"][1]["tally"]["slightly"], 1);
    }

    #[test]
    fn run_compares_with_the_reference() {
        let dir = scratch_dir("reference");
        let config = write_survey(&dir);
        let mut args = default_args();
        args.config = Some(config);
        args.view = vec!["pie".to_string()];
        run_survey(&args).unwrap();

        // Same output: accepted.
        let summary = dir.join("summary.json");
        args.reference = Some(summary.display().to_string());
        run_survey(&args).unwrap();

        // Changed output: rejected.
        let mut js = read_js(&summary);
        js["respondents"] = serde_json::json!(3);
        let reference = dir.join("reference.json");
        fs::write(&reference, serde_json::to_string(&js).unwrap()).unwrap();
        args.reference = Some(reference.display().to_string());
        assert!(matches!(
            run_survey(&args),
            Err(SurveyError::ReferenceMismatch { .. })
        ));
    }

    #[test]
    fn run_rejects_bad_flags() {
        let dir = scratch_dir("bad-flags");
        let mut args = default_args();
        args.config = Some(write_survey(&dir));
        args.format = Some("xml".to_string());
        assert!(matches!(run_survey(&args), Err(SurveyError::Whatever { .. })));

        args.format = None;
        args.view = vec!["radar".to_string()];
        assert!(matches!(
            run_survey(&args),
            Err(SurveyError::Tally {
                source: TallyErrors::UnknownView(_)
            })
        ));

        let no_input = default_args();
        assert!(matches!(run_survey(&no_input), Err(SurveyError::Whatever { .. })));
    }

    #[test]
    fn paths_relative_to_the_config() {
        assert_eq!(resolve_path(Some("/data"), "a.csv"), "/data/a.csv");
        assert_eq!(resolve_path(Some("/data"), "/tmp/a.csv"), "/tmp/a.csv");
        assert_eq!(resolve_path(None, "a.csv"), "a.csv");
        assert_eq!(resolve_path(Some(""), "a.csv"), "a.csv");
    }
}
