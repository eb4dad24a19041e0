use crate::services::cleaning::{
    CASH_SETTLEMENT_COLUMN, DATE_COLUMN, STOCK_COLUMN, THREE_MONTH_COLUMN,
};
use crate::value_objects::price_record::PriceRecord;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const TABLE_VIEW_COLUMNS: [&str; 4] = [
    DATE_COLUMN,
    CASH_SETTLEMENT_COLUMN,
    THREE_MONTH_COLUMN,
    STOCK_COLUMN,
];

pub const CHART_TITLE: &str = "Copper Price Trend Over Time";
pub const CHART_X_LABEL: &str = "Date";
pub const CHART_Y_LABEL: &str = "Copper Price";

/// The cleaned records rendered as text, one row per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<[String; 4]>,
}

impl TableView {
    pub fn from_records(records: &[PriceRecord]) -> Self {
        Self {
            columns: TABLE_VIEW_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records
                .iter()
                .map(|r| {
                    [
                        r.date.format("%Y-%m-%d").to_string(),
                        r.cash_settlement.to_string(),
                        r.three_month.to_string(),
                        r.stock.to_string(),
                    ]
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cash-settlement price against date; x is days since 0001-01-01 (CE).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl PriceSeries {
    pub fn from_records(records: &[PriceRecord]) -> Self {
        Self {
            name: CASH_SETTLEMENT_COLUMN.to_string(),
            points: records
                .iter()
                .map(|r| (f64::from(r.date.num_days_from_ce()), r.cash_settlement))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points are in date order, so the ends give the x range.
    pub fn x_bounds(&self) -> (f64, f64) {
        let x_min = self.points.first().map(|p| p.0).unwrap_or(0.0);
        let mut x_max = self.points.last().map(|p| p.0).unwrap_or(x_min + 1.0);
        if x_max <= x_min {
            x_max = x_min + 1.0;
        }
        (x_min, x_max)
    }

    /// Price range padded by 5% on each side.
    pub fn y_bounds(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (_, y) in &self.points {
            min = min.min(*y);
            max = max.max(*y);
        }
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        if max <= min {
            return (min - 1.0, max + 1.0);
        }
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

/// Static description of the trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend: bool,
    pub grid: bool,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            x_label: CHART_X_LABEL.to_string(),
            y_label: CHART_Y_LABEL.to_string(),
            legend: true,
            grid: true,
        }
    }
}

/// Inverse of the chart x coordinate.
pub fn date_from_x(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    let days = i32::try_from(x.round() as i64).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

/// `count` evenly spaced values from `min` to `max`, both ends included.
pub fn ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(min + max) / 2.0],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count).map(|i| min + step * i as f64).collect()
        }
    }
}

pub fn date_tick_labels(min: f64, max: f64, count: usize) -> Vec<String> {
    ticks(min, max, count)
        .into_iter()
        .map(|x| {
            date_from_x(x)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .collect()
}

pub fn price_tick_labels(min: f64, max: f64, count: usize) -> Vec<String> {
    ticks(min, max, count)
        .into_iter()
        .map(|y| format!("{y:.2}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, d: u32, cash: f64) -> PriceRecord {
        PriceRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).expect("date"),
            cash_settlement: cash,
            three_month: cash + 25.5,
            stock: 101_375.0,
        }
    }

    #[test]
    fn table_view_has_four_named_columns_in_order() {
        let view = TableView::from_records(&[record(2020, 1, 2, 6100.0), record(2020, 1, 3, 6125.25)]);
        assert_eq!(
            view.columns,
            vec![
                "date",
                "LME Copper Cash-Settlement",
                "LME Copper 3-month",
                "LME Copper stock"
            ]
        );
        assert_eq!(view.len(), 2);
        assert_eq!(
            view.rows[1],
            [
                "2020-01-03".to_string(),
                "6125.25".to_string(),
                "6150.75".to_string(),
                "101375".to_string()
            ]
        );
    }

    #[test]
    fn series_is_named_and_maps_dates_to_day_numbers() {
        let records = [record(2020, 1, 1, 6000.0), record(2020, 1, 11, 6200.0)];
        let series = PriceSeries::from_records(&records);
        assert_eq!(series.name, "LME Copper Cash-Settlement");
        assert_eq!(series.points[1].0 - series.points[0].0, 10.0);
        assert_eq!(date_from_x(series.points[0].0), Some(records[0].date));

        let (x_min, x_max) = series.x_bounds();
        assert_eq!(x_max - x_min, 10.0);
        let (y_min, y_max) = series.y_bounds();
        assert!((y_min - 5990.0).abs() < 1e-9);
        assert!((y_max - 6210.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_of_degenerate_series_are_widened() {
        let empty = PriceSeries::from_records(&[]);
        assert_eq!(empty.y_bounds(), (0.0, 1.0));
        let (x_min, x_max) = empty.x_bounds();
        assert!(x_max > x_min);

        let flat = PriceSeries::from_records(&[record(2020, 1, 1, 6000.0)]);
        assert_eq!(flat.y_bounds(), (5999.0, 6001.0));
        let (x_min, x_max) = flat.x_bounds();
        assert_eq!(x_max - x_min, 1.0);
    }

    #[test]
    fn tick_labels_cover_both_ends() {
        let x0 = f64::from(NaiveDate::from_ymd_opt(2020, 1, 1).expect("date").num_days_from_ce());
        let labels = date_tick_labels(x0, x0 + 10.0, 3);
        assert_eq!(labels, vec!["2020-01-01", "2020-01-06", "2020-01-11"]);
        assert_eq!(price_tick_labels(0.0, 10.0, 2), vec!["0.00", "10.00"]);
        assert!(ticks(0.0, 1.0, 0).is_empty());
        assert_eq!(ticks(0.0, 1.0, 1), vec![0.5]);
    }

    #[test]
    fn chart_spec_defaults() {
        let spec = ChartSpec::default();
        assert_eq!(spec.title, "Copper Price Trend Over Time");
        assert_eq!(spec.x_label, "Date");
        assert_eq!(spec.y_label, "Copper Price");
        assert!(spec.legend && spec.grid);
    }
}
