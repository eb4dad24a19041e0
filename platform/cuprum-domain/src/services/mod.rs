pub mod cleaning;
pub mod features;
pub mod gbt;
pub mod regression_metrics;
pub mod split;
pub mod table_view;
