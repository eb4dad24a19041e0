pub mod acquisition;
pub mod config;
pub mod presentation;
pub mod training;
pub mod validation;
