pub mod analysis;
pub mod analysis_export;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod pdf;
pub mod player_career;
pub mod player_report;
pub mod report;
pub mod tally;
