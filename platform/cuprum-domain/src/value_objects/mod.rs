pub mod price_record;
pub mod raw_table;
