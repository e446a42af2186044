//! # Yield Gateway Common Library
//!
//! Shared code for the yield prediction gateway:
//! - Configuration loading and resolution
//! - Database bootstrap and row models
//! - API envelope and request types
//! - API key verification

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
