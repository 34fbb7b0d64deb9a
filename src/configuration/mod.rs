pub mod config;
pub mod galaxy;
pub mod generate;
