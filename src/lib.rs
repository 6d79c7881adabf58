pub mod app;
pub mod cli;
pub mod config;
pub mod model;
pub mod schedule;
pub mod sort;
pub mod storage;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
