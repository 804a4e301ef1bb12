pub mod config;
pub mod report_core;
