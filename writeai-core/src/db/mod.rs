//! Database layer for writeai
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - An append-only usage ledger alongside the CRUD tables

pub mod repo;
pub mod schema;

pub use repo::{Database, ProjectQuery, ProjectSort, StatusFilter};
