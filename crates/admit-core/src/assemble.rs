//! Record assembly across the two fetch rounds.
//!
//! Summary rows seed [`PartialRecord`]s keyed by URL; detail results are then
//! merged back by task index in a single pass.

use std::collections::{HashMap, HashSet};

use crate::config::ScrapeConfig;
use crate::models::{DetailFields, PartialRecord, RawAdmission, SummaryRow, result_number_from_url};

/// Builds one partial record per distinct linked row.
///
/// Rows without a link are skipped; the first row seen for a URL wins.
pub fn assemble(rows: Vec<SummaryRow>, config: &ScrapeConfig) -> Vec<PartialRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(href) = row.href.as_deref().map(str::trim).filter(|h| !h.is_empty()) else {
            continue;
        };
        let url = config.detail_url(href);
        if !seen.insert(url.clone()) {
            continue;
        }

        records.push(PartialRecord {
            result_number: result_number_from_url(&url),
            date_added: row.date_added().map(str::to_string),
            term: row.term().map(str::to_string),
            url,
        });
    }

    records
}

/// Completes a partial record with its detail fields, if the fetch succeeded.
pub fn complete(partial: PartialRecord, detail: Option<DetailFields>) -> RawAdmission {
    RawAdmission {
        url: partial.url,
        result_number: partial.result_number,
        date_added: partial.date_added,
        term: partial.term,
        detail: detail.unwrap_or_default(),
    }
}

/// Joins detail results to their partial records by task index.
///
/// Every partial record yields exactly one raw record, in input order.
pub fn merge(
    partials: Vec<PartialRecord>,
    detail_results: Vec<(usize, DetailFields)>,
) -> Vec<RawAdmission> {
    let mut by_index: HashMap<usize, DetailFields> = detail_results.into_iter().collect();

    partials
        .into_iter()
        .enumerate()
        .map(|(index, partial)| complete(partial, by_index.remove(&index)))
        .collect()
}
