use std::fs;

use likert_tally::{Category, ChartOptions, Vocabulary};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::survey::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "barTitle")]
    pub bar_title: Option<String>,
    #[serde(rename = "pieTitle")]
    pub pie_title: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "maxLabelLength")]
    pub max_label_length: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub delimiter: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// The field separator of delimited files. Defaults to a comma.
    pub fn delimiter_byte(&self) -> SurveyResult<u8> {
        match self.delimiter.as_deref() {
            None | Some("") => Ok(b','),
            Some("\\t") | Some("tab") => Ok(b'\t'),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => whatever!(
                "The delimiter must be a single ASCII character, got {:?}",
                d
            ),
        }
    }
}

/// Changes to one of the answer options.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CategorySettings {
    /// One of `highly`, `moderately`, `slightly`, `not`.
    pub level: String,
    pub label: Option<String>,
    pub color: Option<String>,
    pub synonyms: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "fileSource", default)]
    pub file_source: FileSource,
    #[serde(default)]
    pub categories: Vec<CategorySettings>,
    #[serde(rename = "defaultView")]
    pub default_view: Option<String>,
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Applies the category settings on top of the default motivation vocabulary.
pub fn build_vocabulary(categories: &[CategorySettings]) -> SurveyResult<Vocabulary> {
    let mut vocabulary = Vocabulary::motivation();
    for cs in categories.iter() {
        let category = match Category::from_key(cs.level.trim()) {
            Some(c) => c,
            None => whatever!(
                "Unknown answer level {:?} (expected one of highly, moderately, slightly, not)",
                cs.level
            ),
        };
        if let Some(label) = &cs.label {
            vocabulary
                .set_label(category, label)
                .context(TallySnafu {})?;
        }
        if let Some(color) = &cs.color {
            vocabulary.set_color(category, color);
        }
        for synonym in cs.synonyms.iter().flatten() {
            vocabulary
                .add_synonym(synonym, category)
                .context(TallySnafu {})?;
        }
    }
    debug!(
        "build_vocabulary: {} accepted phrasings",
        vocabulary.synonym_count()
    );
    Ok(vocabulary)
}

pub fn build_chart_options(settings: &OutputSettings) -> ChartOptions {
    let mut options = ChartOptions::default();
    if let Some(n) = settings.max_label_length {
        options = options.with_max_label_chars(n);
    }
    if let Some(t) = &settings.bar_title {
        options.bar_title = t.clone();
    }
    if let Some(t) = &settings.pie_title {
        options.pie_title = t.clone();
    }
    options
}

/// Reads a reference output to compare with.
pub fn read_reference(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
