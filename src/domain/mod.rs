//! Core domain types and logic.

pub mod trade;
pub mod generator;
pub mod rule;
pub mod classifier;
pub mod clean;
pub mod metrics;
pub mod pipeline;
pub mod config_validation;
pub mod error;
