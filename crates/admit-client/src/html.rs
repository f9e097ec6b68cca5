//! HTML extraction for GradCafe survey and result pages.
//!
//! Both parsers are lenient: missing elements produce empty values rather
//! than errors. Only an invalid selector is reported as
//! [`AppError::ParseError`].

use admit_core::error::AppError;
use admit_core::models::{DetailFields, SummaryRow};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("selector '{}': {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Parses the survey table into logical rows.
///
/// The first `<table>` is used and its header row skipped. A `<tr>` without
/// a `class` attribute opens a new record; any other `<tr>` (for example the
/// badge row with `class="tw-border-none"`) continues the current one.
pub fn parse_summary_table(html: &str) -> Result<Vec<SummaryRow>, AppError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;
    let link_sel = selector("a[href]")?;

    let Some(table) = document.select(&table_sel).next() else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    let mut current: Option<SummaryRow> = None;

    for tr in table.select(&tr_sel).skip(1) {
        if tr.value().attr("class").is_none() {
            if let Some(done) = current.take() {
                rows.push(done);
            }
            current = Some(SummaryRow::default());
        }
        let row = current.get_or_insert_with(SummaryRow::default);

        if row.href.is_none() {
            row.href = tr
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);
        }
        row.cells.extend(tr.select(&td_sel).map(element_text));
    }

    if let Some(done) = current {
        rows.push(done);
    }

    Ok(rows)
}

/// Parses a result page's `<dl>` into detail fields.
///
/// Direct `<div>` children of the first `<dl>` are read by position. Each
/// value is the `<dd>` text, except position 7 which holds the GRE list:
/// its `<li>` items carry the quant, verbal and analytical-writing scores
/// in their `<b>` elements.
pub fn parse_detail_list(html: &str) -> Result<DetailFields, AppError> {
    let document = Html::parse_document(html);
    let dl_sel = selector("dl")?;
    let dd_sel = selector("dd")?;
    let li_sel = selector("li")?;
    let b_sel = selector("b")?;

    let mut fields = DetailFields::default();
    let Some(dl) = document.select(&dl_sel).next() else {
        return Ok(fields);
    };

    let entries = dl
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div");

    for (index, entry) in entries.enumerate() {
        if index == 7 {
            let scores: Vec<Option<String>> = entry
                .select(&li_sel)
                .map(|li| li.select(&b_sel).next().map(element_text))
                .collect();
            let score = |i: usize| scores.get(i).cloned().flatten();
            fields.gre_quant = score(0);
            fields.gre_verbal = score(1);
            fields.gre_aw = score(2);
            continue;
        }

        let slot = match index {
            0 => &mut fields.university,
            1 => &mut fields.program,
            2 => &mut fields.degree,
            3 => &mut fields.citizenship,
            4 => &mut fields.status,
            5 => &mut fields.status_date,
            6 => &mut fields.gpa,
            8 => &mut fields.comments,
            _ => continue,
        };
        *slot = entry.select(&dd_sel).next().map(element_text);
    }

    Ok(fields)
}
