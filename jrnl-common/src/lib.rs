//! # jrnl Common Library
//!
//! Shared code for the jrnl service crates including:
//! - Database schema, initialization and models
//! - Mood analysis types (`Mood`, `AnalysisResult`)
//! - API authentication and the JSON response envelope
//! - Configuration loading
//! - Utility functions

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use db::models::{AnalysisResult, Mood};
pub use error::{Error, Result};
