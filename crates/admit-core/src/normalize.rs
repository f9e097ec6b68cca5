//! Field normalization from scraped strings to a typed [`Admission`].
//!
//! [`clean`] is pure and total: any input produces a record, with fields
//! that cannot be interpreted left absent.

use chrono::NaiveDate;

use crate::models::{Admission, RawAdmission, Term};

const DATE_ADDED_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y"];

/// Normalizes a raw record.
pub fn clean(raw: RawAdmission) -> Admission {
    let detail = raw.detail;

    Admission {
        result_number: raw.result_number,
        date_added: raw.date_added.as_deref().and_then(parse_date_added),
        term: raw.term.as_deref().and_then(parse_term),
        university: text(detail.university),
        program: text(detail.program),
        degree: text(detail.degree),
        status: text(detail.status),
        status_date: detail.status_date.as_deref().and_then(status_date),
        citizenship: text(detail.citizenship),
        gpa: detail.gpa.as_deref().and_then(score),
        gre_quant: detail.gre_quant.as_deref().and_then(score),
        gre_verbal: detail.gre_verbal.as_deref().and_then(score),
        gre_aw: detail.gre_aw.as_deref().and_then(score),
        comments: text(detail.comments),
        canonical_program: None,
        canonical_university: None,
        url: raw.url,
    }
}

/// Removes line breaks and tabs, trims, and maps empty to `None`.
pub fn strip_text(value: &str) -> Option<String> {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '\n' | '\t' | '\r'))
        .collect();
    let trimmed = stripped.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn text(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(strip_text)
}

/// First line that mentions a season, parsed into a [`Term`].
pub fn parse_term(raw: &str) -> Option<Term> {
    raw.lines()
        .find(|segment| Term::mentions_season(segment))
        .and_then(Term::from_segment)
}

/// Keeps only digits and `/`, e.g. "Accepted on 15/02/2025 via E-mail" -> "15/02/2025".
pub fn status_date(raw: &str) -> Option<String> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '/')
        .collect();
    (!kept.is_empty()).then_some(kept)
}

/// Parses a GPA or GRE score. Zero means "not reported" on the source site.
pub fn score(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let value = trimmed.parse::<f64>().ok().or_else(|| {
        trimmed
            .split_whitespace()
            .find_map(|token| token.parse::<f64>().ok())
    })?;
    (value.is_finite() && value != 0.0).then_some(value)
}

pub fn parse_date_added(raw: &str) -> Option<NaiveDate> {
    let cleaned = strip_text(raw)?;
    DATE_ADDED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}
