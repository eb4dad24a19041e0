use crate::acquisition::fetch_and_clean;
use cuprum_domain::repositories::price_source::PriceTableSource;
use cuprum_domain::services::cleaning::CleaningReport;
use cuprum_domain::services::features::FEATURE_NAMES;
use tracing::info_span;

/// Fetches and cleans without training, and describes what survived.
pub fn validate(source: &dyn PriceTableSource) -> Result<serde_json::Value, String> {
    let _span = info_span!("validate").entered();
    let table = fetch_and_clean(source)?;

    metrics::gauge!("cuprum.validate.invalid_date").set(table.report.invalid_date as f64);
    metrics::gauge!("cuprum.validate.invalid_numeric").set(table.report.invalid_numeric as f64);
    metrics::gauge!("cuprum.validate.duplicates").set(table.report.duplicates as f64);

    Ok(serde_json::json!({
        "source": source.describe(),
        "rows": table.len(),
        "cleaning": report_json(&table.report),
        "features": FEATURE_NAMES,
    }))
}

fn report_json(report: &CleaningReport) -> serde_json::Value {
    serde_json::json!({
        "tables": report.tables,
        "rows_in": report.rows_in,
        "rows_out": report.rows_out,
        "dropped": report.dropped(),
        "header_rows": report.header_rows,
        "invalid_date": report.invalid_date,
        "invalid_numeric": report.invalid_numeric,
        "duplicates": report.duplicates,
        "out_of_order": report.out_of_order,
        "first_date": report.first_date.map(|d| d.to_string()),
        "last_date": report.last_date.map(|d| d.to_string()),
        "first_invalid_date": report.first_invalid_date,
        "first_duplicate": report.first_duplicate.map(|d| d.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::validate;
    use cuprum_domain::repositories::price_source::PriceTableSource;
    use cuprum_domain::value_objects::raw_table::RawTable;

    struct OneTable;

    impl PriceTableSource for OneTable {
        fn describe(&self) -> String {
            "fixture".to_string()
        }

        fn fetch_tables(&self) -> Result<Vec<RawTable>, String> {
            let headers = [
                "date",
                "LME Copper Cash-Settlement",
                "LME Copper 3-month",
                "LME Copper stock",
            ];
            Ok(vec![RawTable::new(
                headers.iter().map(|s| s.to_string()).collect(),
                vec![
                    ["1. January 2020", "6000", "6050", "100"],
                    ["1. January 2020", "6010", "6060", "101"],
                    ["2. January 2020", "n/a", "6060", "101"],
                ]
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
            )])
        }
    }

    #[test]
    fn reports_cleaning_counts() {
        let json = validate(&OneTable).expect("validate");
        assert_eq!(json["source"], "fixture");
        assert_eq!(json["rows"], 1);
        assert_eq!(json["cleaning"]["rows_in"], 3);
        assert_eq!(json["cleaning"]["duplicates"], 1);
        assert_eq!(json["cleaning"]["invalid_numeric"], 1);
        assert_eq!(json["cleaning"]["first_date"], "2020-01-01");
        assert_eq!(json["features"][0], "LME Copper stock");
    }
}
