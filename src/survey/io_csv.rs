// Primitives for reading CSV files.

use std::borrow::Cow;
use std::fs;

use likert_tally::Table;
use log::{debug, warn};
use snafu::prelude::*;

use crate::survey::{
    config_reader::FileSource,
    io_common::{build_table, clean_cell},
    *,
};

pub fn read_csv_table(path: &str, cfs: &FileSource) -> SurveyResult<Table> {
    let delimiter = cfs.delimiter_byte()?;
    let bytes = fs::read(path).context(OpeningFileSnafu { path })?;
    let text = decode_text(path, &bytes);
    parse_delimited(&text, delimiter)
}

/// The text of a file. Bytes that are not valid UTF-8 are replaced, and a
/// warning points at the encoding since none of those answers will match.
pub fn decode_text<'a>(path: &str, bytes: &'a [u8]) -> Cow<'a, str> {
    if let Err(e) = std::str::from_utf8(bytes) {
        warn!(
            "{:?} is not valid UTF-8 (first invalid byte at offset {}): the answers containing non-ASCII letters will not be recognized. Save the file as UTF-8 and try again.",
            path,
            e.valid_up_to()
        );
    }
    String::from_utf8_lossy(bytes)
}

/// Parses delimited text: the first line holds the questions, every other
/// line the answers of one respondent.
///
/// Line endings are normalized and blank lines are dropped before splitting.
/// A line with only delimiters is kept: it is a respondent who answered
/// nothing.
pub fn parse_delimited(text: &str, delimiter: u8) -> SurveyResult<Table> {
    let text = drop_blank_lines(text.trim_start_matches('\u{feff}'));
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut lines: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = line_r
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line())
            .unwrap_or((idx + 1) as u64);
        let line = line_r.context(CsvParseSnafu { lineno })?;
        let cells: Vec<String> = line.iter().map(clean_cell).collect();
        debug!("parse_delimited: lineno: {:?} row: {:?}", lineno, &cells);
        lines.push(cells);
    }

    if lines.len() < 2 {
        return MalformedInputSnafu {
            reason: format!(
                "expected a header line and at least one line of answers, found {} non-blank lines",
                lines.len()
            ),
        }
        .fail();
    }
    let mut iter = lines.into_iter();
    let header = iter.next().unwrap_or_default();
    build_table(header, iter.collect())
}

fn drop_blank_lines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}
