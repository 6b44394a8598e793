pub mod analysis;
pub mod config;
pub mod error;
pub mod indicators;
pub mod scoring;
pub mod store;
pub mod telemetry;
