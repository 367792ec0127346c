// Domain layer - Records, aggregation, filtering and display formatting
pub mod aggregate;
pub mod analytics;
pub mod dashboard;
pub mod directory;
pub mod filter;
pub mod format;
pub mod outcome;
pub mod parse;
pub mod records;
pub mod views;
