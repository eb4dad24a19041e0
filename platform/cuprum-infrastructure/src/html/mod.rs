//! HTML table extraction.
//!
//! Every `<table>` in the document becomes one [`RawTable`]. The header row is the
//! `<thead>` row when there is one, else the first row. Cell text is collapsed to
//! single spaces.

use cuprum_domain::value_objects::raw_table::RawTable;
use scraper::{ElementRef, Html, Selector};

pub fn parse_tables(html: &str) -> Result<Vec<RawTable>, String> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;

    let mut tables = Vec::new();
    for table in document.select(&table_selector) {
        let rows: Vec<ElementRef<'_>> = table
            .select(&row_selector)
            .filter(|row| owning_table(*row).map(|owner| owner.id()) == Some(table.id()))
            .collect();
        if let Some(parsed) = table_from_rows(&rows) {
            tables.push(parsed);
        }
    }

    if tables.is_empty() {
        return Err("no tables found".to_string());
    }
    tracing::debug!(tables = tables.len(), "parsed html tables");
    Ok(tables)
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|err| format!("invalid selector {css:?}: {err}"))
}

fn table_from_rows(rows: &[ElementRef<'_>]) -> Option<RawTable> {
    let header_idx = rows
        .iter()
        .position(|row| parent_name(*row) == Some("thead"))
        .or_else(|| rows.iter().position(|row| !cells(*row).is_empty()))?;

    let headers = cells(rows[header_idx]);
    let body = rows
        .iter()
        .enumerate()
        .filter(|(idx, row)| *idx != header_idx && parent_name(**row) != Some("thead"))
        .map(|(_, row)| cells(*row))
        .filter(|cells| !cells.is_empty())
        .collect();

    Some(RawTable::new(headers, body))
}

fn cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| normalize_text(cell.text()))
        .collect()
}

fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parent_name(row: ElementRef<'_>) -> Option<&str> {
    row.parent()
        .and_then(ElementRef::wrap)
        .map(|parent| parent.value().name())
}

/// Nearest `<table>` ancestor, so rows of nested tables stay with their own table.
fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}
