// ********* Answer vocabulary ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The closed set of answers a respondent can give to a question.
///
/// The order of `Category::ALL` is the display order used by the charts
/// (most motivating first).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Category {
    Highly,
    Moderately,
    Slightly,
    Not,
}

impl Category {
    pub const COUNT: usize = 4;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Highly,
        Category::Moderately,
        Category::Slightly,
        Category::Not,
    ];

    /// Position of the category in `Category::ALL`.
    pub fn index(&self) -> usize {
        match self {
            Category::Highly => 0,
            Category::Moderately => 1,
            Category::Slightly => 2,
            Category::Not => 3,
        }
    }

    /// The key used to refer to this category in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Highly => "highly",
            Category::Moderately => "moderately",
            Category::Slightly => "slightly",
            Category::Not => "not",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.iter().find(|c| c.key() == key).cloned()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The result of reading a single cell.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum NormalizedCell {
    /// The cell maps to one of the categories.
    Category(Category),
    /// Nothing was answered.
    Empty,
    /// Some content that is not part of the vocabulary. The trimmed text is kept
    /// for diagnostics.
    Unrecognized(String),
}

/// Labels, colors and synonyms for each category.
///
/// The categories themselves are fixed, but everything a respondent may
/// write for them is data: new phrasings are added with `add_synonym`
/// without touching the rest of the pipeline.
///
/// ```
/// use likert_tally::{Category, NormalizedCell, Vocabulary};
///
/// let vocabulary = Vocabulary::motivation();
/// assert_eq!(vocabulary.normalize(" HIGH "), NormalizedCell::Category(Category::Highly));
/// assert_eq!(vocabulary.normalize("bardzo motywuje"), NormalizedCell::Category(Category::Highly));
/// assert_eq!(vocabulary.normalize(""), NormalizedCell::Empty);
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vocabulary {
    labels: [String; Category::COUNT],
    colors: [String; Category::COUNT],
    // Keys are stored in the form produced by `phrase_key`.
    synonyms: HashMap<String, Category>,
}

const MOTIVATION_SYNONYMS: &[(&str, Category)] = &[
    // English
    ("high", Category::Highly),
    ("highly", Category::Highly),
    ("very motivating", Category::Highly),
    ("highly motivated", Category::Highly),
    ("moderate", Category::Moderately),
    ("moderately", Category::Moderately),
    ("medium", Category::Moderately),
    ("moderately motivated", Category::Moderately),
    ("slight", Category::Slightly),
    ("slightly", Category::Slightly),
    ("low", Category::Slightly),
    ("a little motivating", Category::Slightly),
    ("slightly motivated", Category::Slightly),
    ("not", Category::Not),
    ("none", Category::Not),
    ("not at all", Category::Not),
    ("not motivated", Category::Not),
    ("demotivating", Category::Not),
    // Polish
    ("bardzo motywuje", Category::Highly),
    ("bardzo motywujące", Category::Highly),
    ("bardzo motywujace", Category::Highly),
    ("bardzo", Category::Highly),
    ("wysoko", Category::Highly),
    ("umiarkowanie motywuje", Category::Moderately),
    ("umiarkowanie motywujące", Category::Moderately),
    ("umiarkowanie motywujace", Category::Moderately),
    ("umiarkowanie", Category::Moderately),
    ("średnio", Category::Moderately),
    ("lekko motywuje", Category::Slightly),
    ("lekko motywujące", Category::Slightly),
    ("trochę motywuje", Category::Slightly),
    ("słabo motywuje", Category::Slightly),
    ("lekko", Category::Slightly),
    ("trochę", Category::Slightly),
    ("nie motywuje", Category::Not),
    ("nie motywujące", Category::Not),
    ("niemotywujące", Category::Not),
    ("nie motywujace", Category::Not),
    ("wcale", Category::Not),
    ("nie", Category::Not),
];

impl Vocabulary {
    /// A vocabulary with the given labels and colors and no synonym besides
    /// the labels themselves.
    pub fn new(
        labels: [String; Category::COUNT],
        colors: [String; Category::COUNT],
    ) -> Result<Vocabulary, TallyErrors> {
        let mut vocabulary = Vocabulary {
            labels: labels.clone(),
            colors,
            synonyms: HashMap::new(),
        };
        for c in Category::ALL {
            vocabulary.add_synonym(&labels[c.index()], c)?;
        }
        Ok(vocabulary)
    }

    /// The four motivation levels, with English and Polish phrasings.
    pub fn motivation() -> Vocabulary {
        let mut synonyms: HashMap<String, Category> = HashMap::new();
        let labels = [
            "Highly motivating".to_string(),
            "Moderately motivating".to_string(),
            "Slightly motivating".to_string(),
            "Not motivating".to_string(),
        ];
        for c in Category::ALL {
            synonyms.insert(phrase_key(&labels[c.index()]), c);
        }
        for (phrase, c) in MOTIVATION_SYNONYMS.iter() {
            synonyms.insert(phrase_key(phrase), *c);
        }
        Vocabulary {
            labels,
            colors: [
                "#4caf50".to_string(),
                "#ffeb3b".to_string(),
                "#ff9800".to_string(),
                "#f44336".to_string(),
            ],
            synonyms,
        }
    }

    pub fn label(&self, category: Category) -> &str {
        &self.labels[category.index()]
    }

    pub fn color(&self, category: Category) -> &str {
        &self.colors[category.index()]
    }

    /// Changes the display label of a category. The new label is also accepted
    /// as an answer; previous phrasings stay valid.
    pub fn set_label(&mut self, category: Category, label: &str) -> Result<(), TallyErrors> {
        self.add_synonym(label, category)?;
        self.labels[category.index()] = label.trim().to_string();
        Ok(())
    }

    pub fn set_color(&mut self, category: Category, color: &str) {
        self.colors[category.index()] = color.to_string();
    }

    /// Registers another phrasing for a category.
    ///
    /// Fails if the phrase is already attached to a different category: the
    /// same answer cannot be counted in two places.
    pub fn add_synonym(&mut self, phrase: &str, category: Category) -> Result<(), TallyErrors> {
        let key = phrase_key(phrase);
        if key.is_empty() {
            return Ok(());
        }
        match self.synonyms.get(&key) {
            Some(existing) if *existing != category => Err(TallyErrors::ConflictingSynonym {
                phrase: phrase.to_string(),
                existing: *existing,
                requested: category,
            }),
            _ => {
                self.synonyms.insert(key, category);
                Ok(())
            }
        }
    }

    pub fn synonym_count(&self) -> usize {
        self.synonyms.len()
    }

    /// Maps the raw content of a cell to a category.
    ///
    /// Surrounding whitespace and quotes are ignored. A cell that is exactly
    /// one of the labels is accepted as is, everything else goes through a
    /// case-insensitive lookup in the synonyms.
    pub fn normalize(&self, raw: &str) -> NormalizedCell {
        let text = strip_quotes(raw);
        if text.is_empty() {
            return NormalizedCell::Empty;
        }
        if let Some(c) = Category::ALL
            .iter()
            .find(|c| self.labels[c.index()] == text)
        {
            return NormalizedCell::Category(*c);
        }
        match self.synonyms.get(&phrase_key(text)) {
            Some(c) => NormalizedCell::Category(*c),
            None => NormalizedCell::Unrecognized(text.to_string()),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary::motivation()
    }
}

/// Removes the whitespace and any enclosing pairs of quotes around a cell.
pub fn strip_quotes(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let quoted = text.len() >= 2
            && ((text.starts_with('"') && text.ends_with('"'))
                || (text.starts_with('\'') && text.ends_with('\'')));
        if !quoted {
            return text;
        }
        text = text[1..text.len() - 1].trim();
    }
}

// Lowercase, single spaces.
fn phrase_key(phrase: &str) -> String {
    strip_quotes(phrase)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

// ********* Tables ***********

/// A parsed survey export: one header per question, one row per respondent.
///
/// Every row has exactly as many cells as there are headers. Use the
/// `Builder` to construct tables from ragged input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A cell that could not be mapped to any category.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct UnrecognizedCell {
    /// Index of the data row (the header row is not counted).
    pub row: usize,
    pub column: usize,
    pub text: String,
}

impl Display for UnrecognizedCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}, column {}: {:?}",
            self.row + 1,
            self.column + 1,
            self.text
        )
    }
}

// ******** Output data structures *********

/// The tally of one question.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct QuestionCounts {
    counts: [u64; Category::COUNT],
}

impl QuestionCounts {
    pub fn get(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn increment(&mut self, category: Category) {
        self.counts[category.index()] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// The counts in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

impl From<[u64; Category::COUNT]> for QuestionCounts {
    fn from(counts: [u64; Category::COUNT]) -> Self {
        QuestionCounts { counts }
    }
}

/// The tally of a whole survey, one entry per header.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AggregateResult {
    pub questions: Vec<QuestionCounts>,
    /// Cells that were skipped because they are not part of the vocabulary.
    pub unrecognized: Vec<UnrecognizedCell>,
    pub empty_cells: u64,
    /// Number of respondents.
    pub rows: usize,
}

impl AggregateResult {
    pub fn total(&self) -> u64 {
        self.questions.iter().map(|q| q.total()).sum()
    }

    pub fn category_total(&self, category: Category) -> u64 {
        self.questions.iter().map(|q| q.get(category)).sum()
    }
}

// ********* Charts **********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ChartView {
    /// Stacked bars, one bar per question.
    Bar,
    /// A single pie with the totals of each category over all questions.
    Pie,
}

impl ChartView {
    pub fn name(&self) -> &'static str {
        match self {
            ChartView::Bar => "bar",
            ChartView::Pie => "pie",
        }
    }
}

impl FromStr for ChartView {
    type Err = TallyErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartView::Bar),
            "pie" => Ok(ChartView::Pie),
            _ => Err(TallyErrors::UnknownView(s.to_string())),
        }
    }
}

/// Presentation settings that the projection does not take from the vocabulary.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartOptions {
    /// Headers longer than this (in characters) get shortened.
    pub max_label_chars: usize,
    /// Number of characters kept from a shortened header.
    pub truncated_label_chars: usize,
    pub ellipsis: String,
    pub bar_title: String,
    pub pie_title: String,
    /// Name of the only series of a pie chart.
    pub pie_series_label: String,
}

impl ChartOptions {
    pub fn with_max_label_chars(self, max_label_chars: usize) -> ChartOptions {
        let truncated_label_chars = max_label_chars.saturating_sub(self.ellipsis.chars().count());
        ChartOptions {
            max_label_chars,
            truncated_label_chars,
            ..self
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            max_label_chars: 30,
            truncated_label_chars: 27,
            ellipsis: "...".to_string(),
            bar_title: "Employee Motivation Factors".to_string(),
            pie_title: "Overall Response Distribution".to_string(),
            pie_series_label: "Responses".to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Series {
    pub label: String,
    pub data: Vec<u64>,
    /// One color for the whole series (bar) or one per value (pie).
    pub colors: Vec<String>,
}

/// Everything a chart renderer needs, as plain labels and numbers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartSpec {
    pub view: ChartView,
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Projection {
    Chart(ChartSpec),
    /// All the values are zero, there is nothing worth drawing.
    NoData,
}

/// Errors that prevent the survey from being tallied or charted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    EmptyInput,
    NoHeaders,
    /// Not a single cell of the table belongs to the vocabulary.
    /// Carries a sample of the rejected cells.
    NoRecognizedAnswers {
        sample: Vec<UnrecognizedCell>,
    },
    NoValidAnswers,
    HeaderMismatch {
        headers: usize,
        questions: usize,
    },
    ConflictingSynonym {
        phrase: String,
        existing: Category,
        requested: Category,
    },
    UnknownView(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyInput => write!(f, "the survey has no questions or no answers"),
            TallyErrors::NoHeaders => write!(f, "all the question headers are blank"),
            TallyErrors::NoRecognizedAnswers { .. } => {
                write!(f, "no answer in the file matches the expected answer options")
            }
            TallyErrors::NoValidAnswers => write!(f, "no valid answer could be counted"),
            TallyErrors::HeaderMismatch { headers, questions } => write!(
                f,
                "{} headers were provided for {} tallied questions",
                headers, questions
            ),
            TallyErrors::ConflictingSynonym {
                phrase,
                existing,
                requested,
            } => write!(
                f,
                "the answer {:?} cannot mean both {} and {}",
                phrase, existing, requested
            ),
            TallyErrors::UnknownView(v) => {
                write!(f, "unknown chart type {:?} (expected bar or pie)", v)
            }
        }
    }
}
