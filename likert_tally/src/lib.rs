mod config;
pub mod builder;
pub mod chart;
pub mod manual;

use log::{debug, info, warn};

pub use crate::chart::project;
pub use crate::config::*;

// Number of rejected cells kept in a `NoRecognizedAnswers` error.
const MAX_SAMPLE_CELLS: usize = 10;

/// Checks that a table can be tallied.
///
/// Columns with a blank header are removed, along with the matching cell of
/// every row, so the remaining headers keep their own answers.
///
/// The table is rejected when it has no question or no respondent, or when
/// none of its cells belongs to the vocabulary. The last check catches files
/// in the wrong format or the wrong language before they turn into an empty
/// chart.
pub fn validate(table: Table, vocabulary: &Vocabulary) -> Result<Table, TallyErrors> {
    if table.headers.is_empty() {
        return Err(TallyErrors::EmptyInput);
    }
    let kept_columns: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.trim().is_empty())
        .map(|(idx, _)| idx)
        .collect();
    if kept_columns.is_empty() {
        return Err(TallyErrors::NoHeaders);
    }
    if table.rows.is_empty() {
        return Err(TallyErrors::EmptyInput);
    }

    let table = if kept_columns.len() < table.headers.len() {
        debug!(
            "validate: dropping {} columns with a blank header",
            table.headers.len() - kept_columns.len()
        );
        select_columns(&table, &kept_columns)
    } else {
        table
    };

    let mut sample: Vec<UnrecognizedCell> = Vec::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            match vocabulary.normalize(cell) {
                NormalizedCell::Category(_) => {
                    return Ok(table);
                }
                NormalizedCell::Unrecognized(text) => {
                    debug!(
                        "validate: row {} column {}: unrecognized answer {:?}",
                        row_idx, col_idx, text
                    );
                    if sample.len() < MAX_SAMPLE_CELLS {
                        sample.push(UnrecognizedCell {
                            row: row_idx,
                            column: col_idx,
                            text,
                        });
                    }
                }
                NormalizedCell::Empty => {}
            }
        }
    }
    Err(TallyErrors::NoRecognizedAnswers { sample })
}

fn select_columns(table: &Table, columns: &[usize]) -> Table {
    Table {
        headers: columns.iter().map(|idx| table.headers[*idx].clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|idx| row.get(*idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect(),
    }
}

/// Counts, for every question, how many respondents gave each answer.
///
/// Empty and unrecognized cells are skipped and reported in the result; they
/// are never counted in a category.
///
/// ```
/// use likert_tally::builder::Builder;
/// use likert_tally::{aggregate, Category, Vocabulary};
///
/// let mut builder = Builder::new(&["Salary".to_string()]);
/// builder.add_row_str(&["high"]);
/// builder.add_row_str(&["Not motivating"]);
/// builder.add_row_str(&["no idea"]);
///
/// let result = aggregate(&builder.build(), &Vocabulary::motivation())?;
/// assert_eq!(result.questions[0].get(Category::Highly), 1);
/// assert_eq!(result.questions[0].get(Category::Not), 1);
/// assert_eq!(result.questions[0].total(), 2);
/// # Ok::<(), likert_tally::TallyErrors>(())
/// ```
pub fn aggregate(table: &Table, vocabulary: &Vocabulary) -> Result<AggregateResult, TallyErrors> {
    info!(
        "Tallying {} answers to {} questions",
        table.rows.len(),
        table.headers.len()
    );
    let num_questions = table.headers.len();
    let mut questions: Vec<QuestionCounts> = vec![QuestionCounts::default(); num_questions];
    let mut unrecognized: Vec<UnrecognizedCell> = Vec::new();
    let mut empty_cells: u64 = 0;

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, counts) in questions.iter_mut().enumerate() {
            let cell = row.get(col_idx).map(|s| s.as_str()).unwrap_or("");
            match vocabulary.normalize(cell) {
                NormalizedCell::Category(c) => counts.increment(c),
                NormalizedCell::Empty => {
                    empty_cells += 1;
                }
                NormalizedCell::Unrecognized(text) => {
                    debug!(
                        "aggregate: row {} column {}: skipping unrecognized answer {:?}",
                        row_idx, col_idx, text
                    );
                    unrecognized.push(UnrecognizedCell {
                        row: row_idx,
                        column: col_idx,
                        text,
                    });
                }
            }
        }
    }

    let result = AggregateResult {
        questions,
        unrecognized,
        empty_cells,
        rows: table.rows.len(),
    };

    if !result.unrecognized.is_empty() {
        warn!(
            "Skipped {} unrecognized answers (first: {})",
            result.unrecognized.len(),
            result.unrecognized[0]
        );
    }
    for (header, counts) in table.headers.iter().zip(result.questions.iter()) {
        debug!("aggregate: {:?}: {:?}", header, counts);
    }

    if result.total() == 0 {
        return Err(TallyErrors::NoValidAnswers);
    }
    info!(
        "Counted {} answers ({} empty, {} unrecognized)",
        result.total(),
        result.empty_cells,
        result.unrecognized.len()
    );
    Ok(result)
}
