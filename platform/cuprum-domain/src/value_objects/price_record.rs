use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One LME copper trading day as published in the westmetall table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub cash_settlement: f64,
    pub three_month: f64,
    pub stock: f64,
}

impl PriceRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

#[cfg(test)]
mod tests {
    use super::PriceRecord;
    use chrono::NaiveDate;

    #[test]
    fn calendar_fields_follow_date() {
        let record = PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 2, 29).expect("date"),
            cash_settlement: 8_500.0,
            three_month: 8_560.5,
            stock: 120_000.0,
        };
        assert_eq!(record.year(), 2024);
        assert_eq!(record.month(), 2);
        assert_eq!(record.day(), 29);
    }
}
