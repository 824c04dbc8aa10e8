use log::{debug, info};

use crate::config::*;

/// Reshapes a tally into the labels and series of a chart.
///
/// Arguments:
/// * `headers` the questions, in the same order as `result.questions`
/// * `result` the tally to display
/// * `view` bar: one series per category and one bar per question;
///   pie: one slice per category, summed over all the questions
///
/// Returns `Projection::NoData` when every value is zero. A mismatch between
/// the headers and the tally is an error.
pub fn project(
    headers: &[String],
    result: &AggregateResult,
    view: ChartView,
    vocabulary: &Vocabulary,
    options: &ChartOptions,
) -> Result<Projection, TallyErrors> {
    if headers.len() != result.questions.len() {
        return Err(TallyErrors::HeaderMismatch {
            headers: headers.len(),
            questions: result.questions.len(),
        });
    }
    let spec = match view {
        ChartView::Bar => bar_chart(headers, result, vocabulary, options),
        ChartView::Pie => pie_chart(result, vocabulary, options),
    };
    if !spec.has_data() {
        info!("project: nothing to display in the {} chart", view.name());
        return Ok(Projection::NoData);
    }
    debug!("project: {:?}", spec);
    Ok(Projection::Chart(spec))
}

fn bar_chart(
    headers: &[String],
    result: &AggregateResult,
    vocabulary: &Vocabulary,
    options: &ChartOptions,
) -> ChartSpec {
    let series = Category::ALL
        .iter()
        .map(|c| Series {
            label: vocabulary.label(*c).to_string(),
            data: result.questions.iter().map(|q| q.get(*c)).collect(),
            colors: vec![vocabulary.color(*c).to_string()],
        })
        .collect();
    ChartSpec {
        view: ChartView::Bar,
        title: options.bar_title.clone(),
        labels: headers
            .iter()
            .enumerate()
            .map(|(idx, h)| question_label(idx, h, options))
            .collect(),
        series,
    }
}

fn pie_chart(result: &AggregateResult, vocabulary: &Vocabulary, options: &ChartOptions) -> ChartSpec {
    ChartSpec {
        view: ChartView::Pie,
        title: options.pie_title.clone(),
        labels: Category::ALL
            .iter()
            .map(|c| vocabulary.label(*c).to_string())
            .collect(),
        series: vec![Series {
            label: options.pie_series_label.clone(),
            data: Category::ALL
                .iter()
                .map(|c| result.category_total(*c))
                .collect(),
            colors: Category::ALL
                .iter()
                .map(|c| vocabulary.color(*c).to_string())
                .collect(),
        }],
    }
}

/// The axis label of a question: long headers are shortened, blank headers
/// get a generic name.
pub fn question_label(idx: usize, header: &str, options: &ChartOptions) -> String {
    let h = header.trim();
    if h.is_empty() {
        return format!("Question {}", idx + 1);
    }
    if h.chars().count() > options.max_label_chars {
        let prefix: String = h.chars().take(options.truncated_label_chars).collect();
        format!("{}{}", prefix, options.ellipsis)
    } else {
        h.to_string()
    }
}

impl ChartSpec {
    pub fn total(&self) -> u64 {
        self.series.iter().flat_map(|s| s.data.iter()).sum()
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| s.data.iter().any(|x| *x > 0))
    }

    /// The share of each value of the first series, in percent of the values
    /// that are not hidden.
    ///
    /// Hidden values (given by index) have no share. The shares are always
    /// computed from the current values so that hiding a slice updates all
    /// the others.
    pub fn slice_percentages(&self, hidden: &[usize]) -> Vec<Option<f64>> {
        let data: &[u64] = match self.series.first() {
            Some(s) => &s.data,
            None => return Vec::new(),
        };
        let visible_total: u64 = data
            .iter()
            .enumerate()
            .filter(|(idx, _)| !hidden.contains(idx))
            .map(|(_, x)| *x)
            .sum();
        data.iter()
            .enumerate()
            .map(|(idx, x)| {
                if hidden.contains(&idx) || visible_total == 0 {
                    None
                } else {
                    Some((*x as f64) * 100.0 / (visible_total as f64))
                }
            })
            .collect()
    }

    /// Legend lines of a pie chart, for example `High: 3 (37.5%)`.
    pub fn legend_entries(&self, hidden: &[usize]) -> Vec<String> {
        let data: &[u64] = match self.series.first() {
            Some(s) => &s.data,
            None => return Vec::new(),
        };
        let percentages = self.slice_percentages(hidden);
        self.labels
            .iter()
            .zip(data.iter())
            .zip(percentages.iter())
            .map(|((label, value), pct)| match pct {
                Some(p) => format!("{}: {} ({:.1}%)", label, value, p),
                None => format!("{}: {}", label, value),
            })
            .collect()
    }
}
