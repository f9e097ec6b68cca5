//! Domain models for admissions records.
//!
//! A record moves through three shapes:
//!
//! 1. [`PartialRecord`] - built from a summary-table row (URL, date added, term)
//! 2. [`RawAdmission`] - the partial record merged with its detail-page fields,
//!    still holding the scraped strings
//! 3. [`Admission`] - normalized and immutable; what gets persisted

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// Term
// =============================================================================

/// Admission season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Spring,
}

impl Season {
    fn keyword(self) -> &'static str {
        match self {
            Season::Fall => "fall",
            Season::Spring => "spring",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Fall => write!(f, "Fall"),
            Season::Spring => write!(f, "Spring"),
        }
    }
}

/// A start term such as "Fall 2025".
///
/// Serialized as its display string so the hand-off file and the database
/// column hold the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Term {
    pub season: Season,
    pub year: u16,
}

impl Term {
    pub fn new(season: Season, year: u16) -> Self {
        Self { season, year }
    }

    /// Reads a term out of a short free-text segment like "Fall 2025" or
    /// "spring 2026 (rolling)".
    ///
    /// Returns `None` when the segment has no season keyword or no four-digit year.
    pub fn from_segment(segment: &str) -> Option<Self> {
        let lower = segment.to_lowercase();
        let season = [Season::Fall, Season::Spring]
            .into_iter()
            .find(|s| lower.contains(s.keyword()))?;
        let year = first_year(segment)?;
        Some(Self { season, year })
    }

    /// Returns true if the segment mentions a season keyword.
    pub fn mentions_season(segment: &str) -> bool {
        let lower = segment.to_lowercase();
        lower.contains(Season::Fall.keyword()) || lower.contains(Season::Spring.keyword())
    }
}

/// Finds the first run of exactly four ASCII digits.
fn first_year(text: &str) -> Option<u16> {
    let bytes = text.as_bytes();
    let mut start = None;
    for (i, b) in bytes.iter().enumerate().chain(std::iter::once((bytes.len(), &b' '))) {
        match (b.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s == 4 {
                    return text[s..i].parse().ok();
                }
                start = None;
            }
            _ => {}
        }
    }
    None
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

impl FromStr for Term {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Term::from_segment(s).ok_or_else(|| AppError::Generic(format!("Invalid term: '{}'", s)))
    }
}

impl TryFrom<String> for Term {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Term> for String {
    fn from(term: Term) -> Self {
        term.to_string()
    }
}

// =============================================================================
// Scraped shapes
// =============================================================================

/// One logical row of the summary table.
///
/// A logical row may span several `<tr>` elements; their `<td>` texts are
/// concatenated in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRow {
    /// The first link found in the row, usually `/result/<n>`.
    pub href: Option<String>,
    /// Cell texts across all markup rows of this record.
    pub cells: Vec<String>,
}

impl SummaryRow {
    /// Cell holding the "date added" text.
    pub const DATE_ADDED_CELL: usize = 2;
    /// Cell holding the badge block (term, citizenship, scores) of the continuation row.
    pub const TERM_CELL: usize = 5;

    pub fn date_added(&self) -> Option<&str> {
        self.cells.get(Self::DATE_ADDED_CELL).map(String::as_str)
    }

    pub fn term(&self) -> Option<&str> {
        self.cells.get(Self::TERM_CELL).map(String::as_str)
    }
}

/// Raw fields scraped from a detail page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFields {
    pub university: Option<String>,
    pub program: Option<String>,
    pub degree: Option<String>,
    pub citizenship: Option<String>,
    pub status: Option<String>,
    pub status_date: Option<String>,
    pub gpa: Option<String>,
    pub gre_quant: Option<String>,
    pub gre_verbal: Option<String>,
    pub gre_aw: Option<String>,
    pub comments: Option<String>,
}

impl DetailFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A record seeded from the summary table, waiting for its detail fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    pub url: String,
    pub result_number: Option<i32>,
    pub date_added: Option<String>,
    pub term: Option<String>,
}

/// A record after merging its detail fields, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAdmission {
    pub url: String,
    pub result_number: Option<i32>,
    pub date_added: Option<String>,
    pub term: Option<String>,
    pub detail: DetailFields,
}

// =============================================================================
// Normalized record
// =============================================================================

/// A normalized admissions record.
///
/// Absent values are `None`; zero or empty placeholders from the source
/// never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    pub url: String,
    pub result_number: Option<i32>,
    pub date_added: Option<NaiveDate>,
    pub term: Option<Term>,
    pub university: Option<String>,
    pub program: Option<String>,
    pub degree: Option<String>,
    pub status: Option<String>,
    pub status_date: Option<String>,
    pub citizenship: Option<String>,
    pub gpa: Option<f64>,
    pub gre_quant: Option<f64>,
    pub gre_verbal: Option<f64>,
    pub gre_aw: Option<f64>,
    pub comments: Option<String>,
    #[serde(default)]
    pub canonical_program: Option<String>,
    #[serde(default)]
    pub canonical_university: Option<String>,
}

impl Admission {
    /// Creates a record holding only its URL, every other field absent.
    pub fn with_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            result_number: result_number_from_url(&url),
            url,
            date_added: None,
            term: None,
            university: None,
            program: None,
            degree: None,
            status: None,
            status_date: None,
            citizenship: None,
            gpa: None,
            gre_quant: None,
            gre_verbal: None,
            gre_aw: None,
            comments: None,
            canonical_program: None,
            canonical_university: None,
        }
    }

    /// The program/university pair handed to a standardizer.
    pub fn name_pair(&self) -> NamePair {
        NamePair {
            program: self.program.clone().unwrap_or_default(),
            university: self.university.clone().unwrap_or_default(),
        }
    }

    pub fn apply_canonical(&mut self, names: CanonicalNames) {
        self.canonical_program = names.program;
        self.canonical_university = names.university;
    }
}

/// Extracts the numeric id from a result URL such as `https://host/result/42`.
pub fn result_number_from_url(url: &str) -> Option<i32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

// =============================================================================
// Standardization
// =============================================================================

/// Input to a standardizer: the scraped program and university names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePair {
    pub program: String,
    pub university: String,
}

/// Canonical names returned by a standardizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalNames {
    pub program: Option<String>,
    pub university: Option<String>,
}

// =============================================================================
// Reporting
// =============================================================================

/// Aggregate store statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_records: i64,
    pub distinct_universities: i64,
    pub max_result_number: Option<i32>,
    pub last_date_added: Option<NaiveDate>,
}

/// Average scores over plausible ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreAverages {
    pub gpa: Option<f64>,
    pub gre: Option<f64>,
    pub gre_v: Option<f64>,
    pub gre_aw: Option<f64>,
}

/// Applicant counts for one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSummary {
    pub term: String,
    pub applicants: i64,
    /// Percentage of applicants with status "Accepted".
    pub acceptance_rate: Option<f64>,
    pub accepted_avg_gpa: Option<f64>,
}

/// Acceptance rates for one degree, split by whether a GPA was reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeAcceptance {
    pub degree: String,
    pub with_gpa: Option<f64>,
    pub without_gpa: Option<f64>,
}

/// Result of an analysis refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_records: i64,
    pub international_percentage: f64,
    pub averages: ScoreAverages,
    pub terms: Vec<TermSummary>,
    pub degree_acceptance: Vec<DegreeAcceptance>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// A zeroed report for an empty store.
    pub fn empty() -> Self {
        Self {
            total_records: 0,
            international_percentage: 0.0,
            averages: ScoreAverages::default(),
            terms: Vec::new(),
            degree_acceptance: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn term(&self, term: &str) -> Option<&TermSummary> {
        self.terms.iter().find(|t| t.term == term)
    }
}
