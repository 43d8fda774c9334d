//! # writeai-core
//!
//! Core library for writeai - an AI writing assistant.
//!
//! This library provides:
//! - Domain types for profiles, projects, the usage ledger, audio
//!   generations, and templates
//! - Database storage layer with SQLite
//! - Quota enforcement for free-plan profiles
//! - HTTP clients for the text and voice generation providers
//! - Dashboard statistics aggregation
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The [`service::Studio`] facade drives the generation workflows: resolve
//! profile, check quota, call the provider, persist the result, append to
//! the ledger. Everything underneath it is usable on its own; the statistics
//! in [`stats`] are pure functions over snapshots so they stay deterministic
//! under test.
//!
//! ## Example
//!
//! ```rust,no_run
//! use writeai_core::{Config, Database, Studio};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let studio = Studio::new(&config, db).expect("failed to build studio");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, ProjectQuery, ProjectSort, StatusFilter};
pub use error::{Error, Result};
pub use service::Studio;
pub use types::*;

// Public modules
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod providers;
pub mod quota;
pub mod service;
pub mod stats;
pub mod text;
pub mod types;
