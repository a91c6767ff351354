#![forbid(unsafe_code)]

//! Core domain model and business logic for the Postop recovery tracker.
//!
//! This crate provides:
//! - Domain types (medications, recovery context, patient records)
//! - Recovery calendar arithmetic
//! - Regimen resolution (today's dose checklist)
//! - Adherence log and optimistic sync
//! - Persistence (record store, config, CSV export)

pub mod types;
pub mod error;
pub mod calendar;
pub mod regimen;
pub mod adherence;
pub mod record;
pub mod sync;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod export;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use adherence::AdherenceLog;
pub use calendar::{recovery_context, recovery_context_at};
pub use regimen::resolve_today;
pub use record::{JsonRecordStore, RecordStore};
pub use sync::SyncController;
pub use catalog::{build_regimen, standard_regimen, validate_regimen, RegimenVariant};
pub use config::Config;
pub use export::write_adherence_report;
pub use tracker::RecoveryTracker;
