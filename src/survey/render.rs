// The chart collaborators: they receive a finished chart description and only
// take care of the output.

use std::io::Write;

use likert_tally::{ChartSpec, ChartView};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::survey::*;

pub trait ChartRenderer {
    fn render(&mut self, spec: &ChartSpec) -> SurveyResult<()>;
}

/// Writes each chart as a JSON document.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> JsonRenderer<W> {
        JsonRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartRenderer for JsonRenderer<W> {
    fn render(&mut self, spec: &ChartSpec) -> SurveyResult<()> {
        let js = chart_spec_to_json(spec);
        let view = spec.view.name();
        serde_json::to_writer_pretty(&mut self.out, &js)
            .map_err(std::io::Error::from)
            .context(RenderFailureSnafu { view })?;
        writeln!(self.out).context(RenderFailureSnafu { view })?;
        Ok(())
    }
}

/// Writes a plain text summary of each chart.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> TextRenderer<W> {
        TextRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_chart(&mut self, spec: &ChartSpec) -> std::io::Result<()> {
        writeln!(self.out, "{}", spec.title)?;
        match spec.view {
            ChartView::Bar => {
                let width = spec
                    .labels
                    .iter()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                for (idx, label) in spec.labels.iter().enumerate() {
                    let counts: Vec<String> = spec
                        .series
                        .iter()
                        .map(|s| format!("{}: {}", s.label, s.data.get(idx).cloned().unwrap_or(0)))
                        .collect();
                    let padding = " ".repeat(width - label.chars().count());
                    writeln!(self.out, "  {}{}  {}", label, padding, counts.join(" | "))?;
                }
            }
            ChartView::Pie => {
                for entry in spec.legend_entries(&[]) {
                    writeln!(self.out, "  {}", entry)?;
                }
                writeln!(self.out, "  Total: {}", spec.total())?;
            }
        }
        writeln!(self.out)
    }
}

impl<W: Write> ChartRenderer for TextRenderer<W> {
    fn render(&mut self, spec: &ChartSpec) -> SurveyResult<()> {
        self.write_chart(spec).context(RenderFailureSnafu {
            view: spec.view.name(),
        })
    }
}

pub fn chart_spec_to_json(spec: &ChartSpec) -> JSValue {
    let datasets: Vec<JSValue> = spec
        .series
        .iter()
        .map(|s| {
            json!({
                "label": s.label,
                "data": s.data,
                "backgroundColor": s.colors,
            })
        })
        .collect();
    json!({
        "type": spec.view.name(),
        "title": spec.title,
        "labels": spec.labels,
        "datasets": datasets,
    })
}

/// The summary of a run: what was read, what was skipped and the charts.
pub fn build_summary_js(tabulation: &Tabulation, charts: &[JSValue]) -> JSValue {
    let mut questions: Vec<JSValue> = Vec::new();
    for (header, counts) in tabulation
        .headers
        .iter()
        .zip(tabulation.result.questions.iter())
    {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (category, count) in counts.iter() {
            tally.insert(category.key().to_string(), json!(count));
        }
        questions.push(json!({ "question": header, "tally": tally }));
    }
    json!({
        "source": tabulation.name,
        "respondents": tabulation.result.rows,
        "skipped": {
            "empty": tabulation.result.empty_cells,
            "unrecognized": tabulation.result.unrecognized.len(),
        },
        "questions": questions,
        "charts": charts,
    })
}

#[cfg(test)]
mod tests {
    use likert_tally::{ChartOptions, Projection, Vocabulary};

    use super::super::io_csv::parse_delimited;
    use super::*;

    fn scenario() -> Tabulation {
        let table = parse_delimited(
            "Q1,Q2\nHighly motivating,Not motivating\nModerately motivating,Highly motivating\n",
            b',',
        )
        .unwrap();
        tabulate("scenario.csv", table, &Vocabulary::motivation()).unwrap()
    }

    fn spec(tab: &Tabulation, view: ChartView) -> ChartSpec {
        match likert_tally::project(
            &tab.headers,
            &tab.result,
            view,
            &Vocabulary::motivation(),
            &ChartOptions::default(),
        )
        .unwrap()
        {
            Projection::Chart(spec) => spec,
            Projection::NoData => panic!("expected a chart"),
        }
    }

    #[test]
    fn bar_chart_as_json() {
        let js = chart_spec_to_json(&spec(&scenario(), ChartView::Bar));
        assert_eq!(js["type"], "bar");
        assert_eq!(js["labels"], json!(["Q1", "Q2"]));
        assert_eq!(js["datasets"].as_array().map(|a| a.len()), Some(4));
        assert_eq!(js["datasets"][0]["label"], "Highly motivating");
        assert_eq!(js["datasets"][0]["data"], json!([1, 1]));
        assert_eq!(js["datasets"][3]["data"], json!([0, 1]));
    }

    #[test]
    fn pie_chart_as_text() {
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&spec(&scenario(), ChartView::Pie)).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with("Overall Response Distribution\n"));
        assert!(text.contains("  Highly motivating: 2 (50.0%)\n"));
        assert!(text.contains("  Slightly motivating: 0 (0.0%)\n"));
        assert!(text.contains("  Total: 4\n"));
    }

    #[test]
    fn bar_chart_as_text() {
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&spec(&scenario(), ChartView::Bar)).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Employee Motivation Factors");
        assert_eq!(
            lines[1],
            "  Q1  Highly motivating: 1 | Moderately motivating: 1 | Slightly motivating: 0 | Not motivating: 0"
        );
    }

    #[test]
    fn json_renderer_writes_one_document_per_chart() {
        let tab = scenario();
        let mut renderer = JsonRenderer::new(Vec::new());
        renderer.render(&spec(&tab, ChartView::Pie)).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let js: JSValue = serde_json::from_str(&text).unwrap();
        assert_eq!(js["datasets"][0]["data"], json!([2, 1, 0, 1]));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_render_failures() {
        let mut renderer = TextRenderer::new(BrokenPipe);
        let res = renderer.render(&spec(&scenario(), ChartView::Bar));
        assert!(matches!(res, Err(SurveyError::RenderFailure { .. })));
    }

    #[test]
    fn summary() {
        let tab = scenario();
        let chart = chart_spec_to_json(&spec(&tab, ChartView::Pie));
        let js = build_summary_js(&tab, &[chart]);
        assert_eq!(js["source"], "scenario.csv");
        assert_eq!(js["respondents"], 2);
        assert_eq!(js["questions"][1]["question"], "Q2");
        assert_eq!(js["questions"][1]["tally"]["not"], 1);
        assert_eq!(js["questions"][1]["tally"]["slightly"], 0);
        assert_eq!(js["charts"][0]["type"], "pie");
    }
}
