use log::warn;

pub use crate::config::*;

/// A builder for tables.
///
/// All the readers go through the builder, which guarantees that every row
/// has as many cells as there are headers.
///
/// ```
/// use likert_tally::builder::Builder;
///
/// let mut builder = Builder::new(&["Q1".to_string(), "Q2".to_string()]);
/// builder.add_row(&["Highly motivating".to_string()]);
/// let table = builder.build();
///
/// assert_eq!(table.rows[0], vec!["Highly motivating".to_string(), "".to_string()]);
/// ```
pub struct Builder {
    pub(crate) _headers: Vec<String>,
    pub(crate) _rows: Vec<Vec<String>>,
}

impl Builder {
    pub fn new(headers: &[String]) -> Builder {
        Builder {
            _headers: headers.to_vec(),
            _rows: Vec::new(),
        }
    }

    /// Adds the answers of one respondent.
    ///
    /// Missing trailing cells are filled with empty answers. Cells beyond the
    /// last header have no question to belong to and are dropped.
    pub fn add_row(&mut self, cells: &[String]) {
        let width = self._headers.len();
        let mut row: Vec<String> = cells.iter().take(width).cloned().collect();
        if cells.len() > width {
            warn!(
                "add_row: row {}: dropping {} cells beyond the last header: {:?}",
                self._rows.len() + 1,
                cells.len() - width,
                &cells[width..]
            );
        }
        row.resize(width, String::new());
        self._rows.push(row);
    }

    pub fn add_row_str(&mut self, cells: &[&str]) {
        let cs: Vec<String> = cells.iter().map(|s| s.to_string()).collect();
        self.add_row(&cs)
    }

    pub fn build(self) -> Table {
        Table {
            headers: self._headers,
            rows: self._rows,
        }
    }
}
