use std::path::Path;

use likert_tally::builder::Builder;
use likert_tally::{strip_quotes, Table};
use log::debug;

use crate::survey::*;

/// The readers available for survey files.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Excel,
}

/// Picks the reader for a file, from the explicit input type if provided or
/// from the extension of the file otherwise.
pub fn detect_provider(path: &str, input_type: Option<&str>) -> SurveyResult<Provider> {
    let format = match input_type {
        Some(t) => t.trim().to_lowercase(),
        None => Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default(),
    };
    match format.as_str() {
        "csv" => Ok(Provider::Csv),
        "excel" | "xlsx" | "xls" => Ok(Provider::Excel),
        _ => UnsupportedFormatSnafu {
            format: if format.is_empty() {
                simplify_file_name(path)
            } else {
                format
            },
        }
        .fail(),
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The text of a cell, without surrounding whitespace or quotes.
pub fn clean_cell(raw: &str) -> String {
    strip_quotes(raw).to_string()
}

/// Assembles the header row and the data rows read from a file.
///
/// Blank trailing header slots are dropped, and the data rows are padded to
/// the number of headers.
pub fn build_table(header: Vec<String>, rows: Vec<Vec<String>>) -> SurveyResult<Table> {
    if rows.is_empty() {
        return MalformedInputSnafu {
            reason: "the file needs a header row and at least one row of answers",
        }
        .fail();
    }
    let mut headers = header;
    while headers.last().map(|h| h.is_empty()).unwrap_or(false) {
        headers.pop();
    }
    if headers.is_empty() {
        return MalformedInputSnafu {
            reason: "no question was found in the first row",
        }
        .fail();
    }
    debug!("build_table: headers: {:?}", headers);

    let mut builder = Builder::new(&headers);
    for row in rows.iter() {
        builder.add_row(row);
    }
    Ok(builder.build())
}
