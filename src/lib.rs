pub mod error;
pub mod format;
pub mod database;
pub mod dataset;
pub mod metrics;
pub mod view;
pub mod selection;
pub mod chart;
pub mod graph;
pub mod notify;
pub mod clipboard;
pub mod dashboard;
pub mod config;
pub mod export;
