use crate::value_objects::raw_table::RawTable;

pub trait PriceTableSource {
    /// Human readable origin, used in logs.
    fn describe(&self) -> String;
    fn fetch_tables(&self) -> Result<Vec<RawTable>, String>;
}
