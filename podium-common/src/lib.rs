//! # Podium Common Library
//!
//! Shared code for the Podium presentation-coaching service:
//! - Error type
//! - Configuration loading and root folder resolution
//! - Database bootstrap (schema, seed data, settings)
//! - Password hashing and bearer tokens
//! - Timestamp helpers

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
