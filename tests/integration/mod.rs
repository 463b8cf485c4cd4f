//! Integration tests for Board Analyst.

pub mod common;
pub mod config_test;
pub mod engine_test;
pub mod pipeline_test;
