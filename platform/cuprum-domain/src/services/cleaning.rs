use crate::value_objects::price_record::PriceRecord;
use crate::value_objects::raw_table::RawTable;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DATE_COLUMN: &str = "date";
pub const CASH_SETTLEMENT_COLUMN: &str = "LME Copper Cash-Settlement";
pub const THREE_MONTH_COLUMN: &str = "LME Copper 3-month";
pub const STOCK_COLUMN: &str = "LME Copper stock";

/// Day, full month name, year: `1. January 2020`.
pub const DATE_FORMAT: &str = "%d. %B %Y";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub tables: usize,
    pub rows_in: usize,
    pub header_rows: usize,
    pub invalid_date: usize,
    pub invalid_numeric: usize,
    pub rows_out: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub first_invalid_date: Option<String>,
    pub first_duplicate: Option<NaiveDate>,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    date: Option<usize>,
    cash_settlement: Option<usize>,
    three_month: Option<usize>,
    stock: Option<usize>,
}

impl ColumnLayout {
    fn locate(table: &RawTable) -> Self {
        Self {
            date: table.column_index(DATE_COLUMN),
            cash_settlement: table.column_index(CASH_SETTLEMENT_COLUMN),
            three_month: table.column_index(THREE_MONTH_COLUMN),
            stock: table.column_index(STOCK_COLUMN),
        }
    }
}

/// Concatenates every table, drops repeated headers and rows with an unparseable
/// date or a non-numeric price field, and returns the survivors sorted by date.
///
/// When a date shows up more than once the last row in source order wins; the
/// report counts those rows as duplicates.
pub fn clean_tables(tables: &[RawTable]) -> Result<(Vec<PriceRecord>, CleaningReport), String> {
    let layouts: Vec<ColumnLayout> = tables.iter().map(ColumnLayout::locate).collect();
    ensure_required_columns(&layouts)?;

    let mut report = CleaningReport {
        tables: tables.len(),
        ..CleaningReport::default()
    };
    let mut by_date: BTreeMap<NaiveDate, PriceRecord> = BTreeMap::new();
    let mut last_seen: Option<NaiveDate> = None;

    for (table, layout) in tables.iter().zip(layouts.iter()) {
        for row in &table.rows {
            report.rows_in += 1;

            let date_cell = layout
                .date
                .and_then(|idx| row.get(idx))
                .map(|cell| cell.trim());
            if date_cell.is_some_and(is_repeated_header) {
                report.header_rows += 1;
                continue;
            }

            let Some(date) = date_cell.and_then(parse_date) else {
                report.invalid_date += 1;
                if report.first_invalid_date.is_none() {
                    report.first_invalid_date = Some(date_cell.unwrap_or("").to_string());
                }
                continue;
            };

            let cash_settlement = numeric_cell(row, layout.cash_settlement);
            let three_month = numeric_cell(row, layout.three_month);
            let stock = numeric_cell(row, layout.stock);
            let (Some(cash_settlement), Some(three_month), Some(stock)) =
                (cash_settlement, three_month, stock)
            else {
                report.invalid_numeric += 1;
                continue;
            };

            if let Some(prev) = last_seen {
                if date < prev {
                    report.out_of_order += 1;
                }
            }
            last_seen = Some(date);

            let record = PriceRecord {
                date,
                cash_settlement,
                three_month,
                stock,
            };
            if by_date.insert(date, record).is_some() {
                report.duplicates += 1;
                if report.first_duplicate.is_none() {
                    report.first_duplicate = Some(date);
                }
            }
        }
    }

    report.first_date = by_date.keys().next().copied();
    report.last_date = by_date.keys().next_back().copied();
    report.rows_out = by_date.len();

    Ok((by_date.into_values().collect(), report))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Numeric coercion: whitespace and `,` thousands separators are ignored, anything
/// that is not a finite number is treated as missing.
pub fn coerce_numeric(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn numeric_cell(row: &[String], column: Option<usize>) -> Option<f64> {
    column
        .and_then(|idx| row.get(idx))
        .and_then(|cell| coerce_numeric(cell))
}

fn is_repeated_header(cell: &str) -> bool {
    cell.eq_ignore_ascii_case(DATE_COLUMN)
}

fn ensure_required_columns(layouts: &[ColumnLayout]) -> Result<(), String> {
    let checks: [(&str, fn(&ColumnLayout) -> Option<usize>); 4] = [
        (DATE_COLUMN, |l: &ColumnLayout| l.date),
        (CASH_SETTLEMENT_COLUMN, |l: &ColumnLayout| l.cash_settlement),
        (THREE_MONTH_COLUMN, |l: &ColumnLayout| l.three_month),
        (STOCK_COLUMN, |l: &ColumnLayout| l.stock),
    ];
    for (name, pick) in checks {
        if !layouts.iter().any(|layout| pick(layout).is_some()) {
            return Err(format!(
                "missing column {name:?} in source tables (tables={})",
                layouts.len()
            ));
        }
    }
    Ok(())
}
