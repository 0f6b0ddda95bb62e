//! GLEC Unified Leads API Library
//!
//! Core functionality for the unified lead scoring and aggregation service:
//! five read-only source readers over the lead-producing tables, pure
//! per-source scoring, the fail-fast aggregation pipeline and the admin HTTP
//! handlers.
//!
//! # Modules
//!
//! - `aggregator`: request validation, concurrent fan-out and the
//!   sort/stats/pagination pipeline.
//! - `analytics`: dashboard rollups over the lead union.
//! - `config`: configuration management.
//! - `db`: database connection and pool management.
//! - `errors`: error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: unified lead and request/response models.
//! - `scoring`: pure per-source lead scoring.
//! - `sources`: read-only source table readers.

pub mod aggregator;
pub mod analytics;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod scoring;
pub mod sources;
