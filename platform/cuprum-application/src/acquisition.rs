use cuprum_domain::repositories::price_source::PriceTableSource;
use cuprum_domain::services::cleaning::{clean_tables, CleaningReport};
use cuprum_domain::value_objects::price_record::PriceRecord;
use std::time::Instant;
use tracing::info_span;

/// Cleaned price history for one run, sorted by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub records: Vec<PriceRecord>,
    pub report: CleaningReport,
}

impl PriceTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn fetch_and_clean(source: &dyn PriceTableSource) -> Result<PriceTable, String> {
    let origin = source.describe();
    let _span = info_span!("acquire", source = %origin).entered();

    let stage_start = Instant::now();
    let tables = source.fetch_tables()?;
    let raw_rows: usize = tables.iter().map(|t| t.rows.len()).sum();
    tracing::info!(tables = tables.len(), rows = raw_rows, "fetched price tables");
    metrics::histogram!("cuprum.acquire.fetch_ms").record(stage_start.elapsed().as_millis() as f64);

    let (records, report) = clean_tables(&tables)?;
    tracing::info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        header_rows = report.header_rows,
        invalid_date = report.invalid_date,
        invalid_numeric = report.invalid_numeric,
        duplicates = report.duplicates,
        out_of_order = report.out_of_order,
        first_date = ?report.first_date,
        last_date = ?report.last_date,
        "cleaned price table"
    );
    if let Some(value) = &report.first_invalid_date {
        tracing::debug!(value = %value, "first unparseable date cell");
    }
    metrics::gauge!("cuprum.acquire.rows_out").set(report.rows_out as f64);
    metrics::gauge!("cuprum.acquire.rows_dropped").set(report.dropped() as f64);

    Ok(PriceTable { records, report })
}

#[cfg(test)]
mod tests {
    use super::fetch_and_clean;
    use cuprum_domain::repositories::price_source::PriceTableSource;
    use cuprum_domain::value_objects::raw_table::RawTable;

    struct StaticSource(Result<Vec<RawTable>, String>);

    impl PriceTableSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        fn fetch_tables(&self) -> Result<Vec<RawTable>, String> {
            self.0.clone()
        }
    }

    fn headers() -> Vec<String> {
        [
            "date",
            "LME Copper Cash-Settlement",
            "LME Copper 3-month",
            "LME Copper stock",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn returns_cleaned_records_with_report() {
        let source = StaticSource(Ok(vec![RawTable::new(
            headers(),
            vec![
                vec!["2. January 2020".into(), "6,100.00".into(), "6,150.00".into(), "110".into()],
                vec!["1. January 2020".into(), "6,000.00".into(), "6,050.00".into(), "100".into()],
                vec!["bogus".into(), "1".into(), "1".into(), "1".into()],
            ],
        )]));

        let table = fetch_and_clean(&source).expect("table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.report.rows_in, 3);
        assert_eq!(table.report.invalid_date, 1);
        assert!(table.records[0].date < table.records[1].date);
    }

    #[test]
    fn propagates_source_errors() {
        let source = StaticSource(Err("request to x failed: refused".to_string()));
        let err = fetch_and_clean(&source).expect_err("fetch error");
        assert!(err.contains("refused"));
    }

    #[test]
    fn propagates_schema_drift() {
        let source = StaticSource(Ok(vec![RawTable::new(
            vec!["date".to_string()],
            vec![vec!["1. January 2020".to_string()]],
        )]));
        let err = fetch_and_clean(&source).expect_err("missing columns");
        assert!(err.contains("missing column"));
    }
}
