pub mod export;
pub mod generator;
pub mod speech;
pub mod templates;
