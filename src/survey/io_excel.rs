use calamine::{open_workbook_auto, DataType, Range, Reader};
use likert_tally::Table;
use log::debug;
use snafu::prelude::*;

use crate::survey::{
    config_reader::FileSource,
    io_common::{build_table, clean_cell},
    *,
};

/// Reads the first worksheet of an Excel workbook (or the worksheet named in
/// the file source).
pub fn read_excel_table(path: &str, cfs: &FileSource) -> SurveyResult<Table> {
    let wrange = get_range(path, cfs)?;
    debug!(
        "read_excel_table: path: {:?} range: {:?} -> {:?}",
        path,
        wrange.start(),
        wrange.end()
    );
    table_from_range(&wrange)
}

/// Converts a worksheet: the first row holds the questions, every following
/// row that is not entirely blank holds the answers of one respondent.
pub fn table_from_range(wrange: &Range<DataType>) -> SurveyResult<Table> {
    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => {
            return MalformedInputSnafu {
                reason: "the worksheet is empty",
            }
            .fail();
        }
    };
    debug!("table_from_range: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|c| c.is_empty()) {
            debug!("table_from_range: idx: {:?}: skipping blank row", idx);
            continue;
        }
        debug!("table_from_range: idx: {:?} row: {:?}", idx, &cells);
        rows.push(cells);
    }
    build_table(header, rows)
}

/// The text of a cell. Whole numbers are written without a decimal part.
pub fn cell_to_string(cell: &DataType) -> String {
    let s = match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        other => format!("{:?}", other),
    };
    clean_cell(&s)
}

fn get_range(path: &str, cfs: &FileSource) -> SurveyResult<Range<DataType>> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = &cfs.excel_worksheet_name {
        debug!(
            "get_range: path: {:?} worksheet: {:?}",
            path, worksheet_name
        );
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(MalformedInputSnafu {
                reason: "the workbook has no worksheet",
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cells: &[&[DataType]]) -> Range<DataType> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range: Range<DataType> = Range::new((0, 0), (height - 1, width - 1));
        for (row_idx, row) in cells.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                range.set_value((row_idx as u32, col_idx as u32), cell.clone());
            }
        }
        range
    }

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn first_row_is_the_header() {
        let range = sheet(&[
            &[s(" Q1 "), s("Q2")],
            &[s("Highly motivating"), s(" Not motivating ")],
            &[s("Moderately motivating"), s("Highly motivating")],
        ]);
        let t = table_from_range(&range).unwrap();
        assert_eq!(t.headers, vec!["Q1", "Q2"]);
        assert_eq!(
            t.rows,
            vec![
                vec!["Highly motivating", "Not motivating"],
                vec!["Moderately motivating", "Highly motivating"]
            ]
        );
    }

    #[test]
    fn blank_rows_and_trailing_headers() {
        let range = sheet(&[
            &[s("Q1"), s("Q2"), DataType::Empty],
            &[DataType::Empty, s("  "), DataType::Empty],
            &[s("high"), DataType::Empty, DataType::Empty],
        ]);
        let t = table_from_range(&range).unwrap();
        assert_eq!(t.headers, vec!["Q1", "Q2"]);
        assert_eq!(t.rows, vec![vec!["high", ""]]);
    }

    #[test]
    fn numbers_are_read_as_text() {
        assert_eq!(cell_to_string(&DataType::Float(3.0)), "3");
        assert_eq!(cell_to_string(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&DataType::Int(7)), "7");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "true");
        assert_eq!(cell_to_string(&s(" \"high\" ")), "high");
    }

    #[test]
    fn header_only_sheet_is_malformed() {
        let range = sheet(&[&[s("Q1"), s("Q2")], &[DataType::Empty, DataType::Empty]]);
        assert!(matches!(
            table_from_range(&range),
            Err(SurveyError::MalformedInput { .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_table("/this/file/does/not/exist.xlsx", &FileSource::default());
        assert!(matches!(res, Err(SurveyError::OpeningExcel { .. })));
    }
}
