//! Board Analyst - ask business questions over deal and work-order boards.
//!
//! This library exposes the core modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod query;
pub mod session;
pub mod source;
pub mod table;
