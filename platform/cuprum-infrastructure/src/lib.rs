pub mod html;
pub mod sources;
