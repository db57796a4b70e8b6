//! # Refound Common Library
//!
//! Shared code for the Refound lost-and-found matching backend:
//! - Error types used across the workspace
//! - Domain records (items, matches, notifications, chat messages)
//! - Event types and the broadcast EventBus (live-delivery backbone)
//! - Configuration loading
//! - Database pool and schema initialization

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod models;

pub use config::MatchingConfig;
pub use error::{Error, Result};
