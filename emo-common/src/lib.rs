//! # Emotion Game Common Library
//!
//! Shared code for the emotion game services:
//! - Configuration loading and root folder resolution
//! - Common error type
//! - Tracing initialization
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
