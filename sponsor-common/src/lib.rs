//! # Sponsor Common Library
//!
//! Shared code for the sponsor back-office services:
//! - Participant model and database bootstrap
//! - Configuration loading and tiered resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
