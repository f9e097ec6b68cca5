//! Offline standardizers.
//!
//! [`HeuristicStandardizer`] applies a small set of rules (title-casing,
//! known abbreviations and misspellings) and needs no network access.
//! [`DisabledStandardizer`] turns the standardization stage off.

use crate::AppError;
use crate::models::{CanonicalNames, NamePair};
use crate::traits::Standardizer;

/// Known university spellings and abbreviations, keyed by lowercased input.
const KNOWN_UNIVERSITIES: &[(&str, &str)] = &[
    ("mcg", "McGill University"),
    ("mcg.", "McGill University"),
    ("mcgill", "McGill University"),
    ("ubc", "University of British Columbia"),
    ("u.b.c", "University of British Columbia"),
    ("u.b.c.", "University of British Columbia"),
    ("uoft", "University of Toronto"),
    ("mcgiill university", "McGill University"),
    ("mcgill university", "McGill University"),
];

/// Program misspellings, keyed by lowercased input.
const PROGRAM_FIXES: &[(&str, &str)] = &[
    ("mathematic", "Mathematics"),
    ("info studies", "Information Studies"),
];

/// Rule-based standardizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStandardizer;

impl HeuristicStandardizer {
    pub fn new() -> Self {
        Self
    }

    pub fn standardize_one(&self, pair: &NamePair) -> CanonicalNames {
        CanonicalNames {
            program: canonical_program(&pair.program),
            university: canonical_university(&pair.university),
        }
    }
}

impl Standardizer for HeuristicStandardizer {
    async fn standardize(&self, pairs: &[NamePair]) -> Result<Vec<CanonicalNames>, AppError> {
        Ok(pairs.iter().map(|pair| self.standardize_one(pair)).collect())
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Standardizer that never runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStandardizer;

impl Standardizer for DisabledStandardizer {
    async fn standardize(&self, pairs: &[NamePair]) -> Result<Vec<CanonicalNames>, AppError> {
        Ok(vec![CanonicalNames::default(); pairs.len()])
    }

    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_program(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        return None;
    }
    match lookup(PROGRAM_FIXES, &collapsed.to_lowercase()) {
        Some(fixed) => Some(fixed.to_string()),
        None => Some(title_case(&collapsed)),
    }
}

fn canonical_university(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let collapsed = collapsed.trim_matches(',').trim();
    if collapsed.is_empty() {
        return None;
    }

    match lookup(KNOWN_UNIVERSITIES, &collapsed.to_lowercase()) {
        Some(known) => Some(known.to_string()),
        None => Some(lower_of(&title_case(collapsed))),
    }
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Lowers the standalone word "Of".
fn lower_of(value: &str) -> String {
    value
        .split(' ')
        .map(|word| if word == "Of" { "of" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}
