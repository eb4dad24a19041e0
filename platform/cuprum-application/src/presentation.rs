use crate::acquisition::PriceTable;
use crate::config::DashboardConfig;
use cuprum_domain::services::table_view::{ChartSpec, PriceSeries, TableView};
use std::io::Write;

/// Everything the dashboard renders, derived from the cleaned table.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub title: String,
    pub header: String,
    pub table: TableView,
    pub series: PriceSeries,
    pub chart: ChartSpec,
}

pub fn build_presentation(table: &PriceTable, config: &DashboardConfig) -> Presentation {
    Presentation {
        title: config.title.clone(),
        header: config.header.clone(),
        table: TableView::from_records(&table.records),
        series: PriceSeries::from_records(&table.records),
        chart: ChartSpec::default(),
    }
}

/// Writes the table view as CSV, header row first.
pub fn write_table_csv<W: Write>(view: &TableView, out: W) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(&view.columns)
        .map_err(|err| format!("failed to write csv header: {err}"))?;
    for row in &view.rows {
        writer
            .write_record(row)
            .map_err(|err| format!("failed to write csv row: {err}"))?;
    }
    writer
        .flush()
        .map_err(|err| format!("failed to flush csv output: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{build_presentation, write_table_csv};
    use crate::acquisition::PriceTable;
    use crate::config::DashboardConfig;
    use chrono::NaiveDate;
    use cuprum_domain::services::cleaning::CleaningReport;
    use cuprum_domain::value_objects::price_record::PriceRecord;

    fn table() -> PriceTable {
        PriceTable {
            records: vec![
                PriceRecord {
                    date: NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
                    cash_settlement: 6000.0,
                    three_month: 6050.0,
                    stock: 100.0,
                },
                PriceRecord {
                    date: NaiveDate::from_ymd_opt(2020, 1, 2).expect("date"),
                    cash_settlement: 6100.5,
                    three_month: 6150.0,
                    stock: 110.0,
                },
            ],
            report: CleaningReport::default(),
        }
    }

    #[test]
    fn presentation_uses_config_titles_and_named_series() {
        let presentation = build_presentation(&table(), &DashboardConfig::default());
        assert_eq!(presentation.title, "Copper Price Forecast");
        assert_eq!(presentation.header, "Data Overview");
        assert_eq!(presentation.table.len(), 2);
        assert_eq!(presentation.series.points.len(), 2);
        assert_eq!(presentation.series.name, "LME Copper Cash-Settlement");
        assert!(presentation.chart.legend);
    }

    #[test]
    fn csv_has_the_four_columns_in_order() {
        let presentation = build_presentation(&table(), &DashboardConfig::default());
        let mut out = Vec::new();
        write_table_csv(&presentation.table, &mut out).expect("csv");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,LME Copper Cash-Settlement,LME Copper 3-month,LME Copper stock"
        );
        assert_eq!(lines[2], "2020-01-02,6100.5,6150,110");
        assert_eq!(lines.len(), 3);
    }
}
