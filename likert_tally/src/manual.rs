/*!

This is the long-form manual for `likert_tally` and `likertchart`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values (or any other single-character delimiter)
* `excel` Excel workbooks (`.xlsx` and `.xls`)

When no input type is given, it is guessed from the extension of the file.
Any other extension is rejected before the file is read.

Both formats share the same layout: the first row holds one question per
column, and each following row holds the answers of one respondent.

```text
Salary,Remote work,Training budget
Highly motivating,Not motivating,high
Moderately motivating,Highly motivating,
bardzo motywuje,nie motywuje,low
```

Blank lines are ignored. A line with only delimiters (`,,`) is a respondent
who did not answer. Rows shorter than the header row are completed with
empty answers. Columns without a header are ignored.

### csv

Fields are separated by commas unless a `delimiter` is configured. Fields may
be quoted; quotes around a field are removed. Spreadsheet tools sometimes quote
a field twice or use single quotes: every enclosing pair of `"` or `'` is
removed, so `"'high'"` reads as `high`. The file must be encoded in UTF-8;
other encodings produce a warning and the answers with accented letters are
not recognized.

### excel

Only the first worksheet is read, unless `excelWorksheetName` is provided.
Rows where all the cells are blank are skipped. Numbers are read as text.

## Answers

Each cell is matched against the four answer options:

| key          | label                   | examples of accepted answers                      |
|--------------|-------------------------|---------------------------------------------------|
| `highly`     | `Highly motivating`     | `high`, `highly`, `bardzo motywuje`, `bardzo`     |
| `moderately` | `Moderately motivating` | `moderate`, `medium`, `umiarkowanie motywuje`     |
| `slightly`   | `Slightly motivating`   | `slight`, `low`, `lekko motywuje`, `trochę`       |
| `not`        | `Not motivating`        | `not`, `none`, `not at all`, `nie motywuje`       |

Matching ignores case, surrounding spaces and surrounding quotes. Answers that
match nothing are skipped and reported in the logs: they are never counted in
one of the options. A file where no answer at all can be matched is rejected.

## Charts

* `bar` one stacked bar per question, one color per answer option. Questions
  longer than 30 characters are shortened.
* `pie` one slice per answer option, with the number of answers over all the
  questions. The percentages are computed from the slices that are displayed.

## Configuration

`likertchart` comes with sensible defaults but the labels, colors and accepted
phrasings can be changed with a configuration file in JSON:

```json
{
  "outputSettings": {
    "barTitle": "Motivation survey 2024",
    "pieTitle": "All answers",
    "outputPath": "chart.json",
    "maxLabelLength": 40
  },
  "fileSource": {
    "filePath": "answers.csv",
    "provider": "csv",
    "delimiter": ";"
  },
  "categories": [
    { "level": "highly", "label": "Strongly agree", "synonyms": ["sehr motivierend"] },
    { "level": "not", "color": "#9e9e9e" }
  ],
  "defaultView": "pie"
}
```

Notes:
- `filePath` is relative to the configuration file.
- `categories` only lists the options to change. `level` is one of the keys
  above. An answer cannot be a synonym of two different options.
- the command line flags `--input`, `--input-type`, `--out`, `--view`,
  `--delimiter` and `--excel-worksheet-name` take precedence over the
  configuration file.

 */
