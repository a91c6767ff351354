//! Core domain types for the recovery adherence tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Medication kinds and per-item regimen entries
//! - The derived recovery context (day offset, week index, healing)
//! - Date and dose-slot keys for the adherence log
//! - Today's checklist items
//! - The patient record (the unit of remote persistence)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Medication Types
// ============================================================================

/// Class of a post-operative medication
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MedicationKind {
    Antibiotic,
    Nsaid,
    Steroid,
}

impl fmt::Display for MedicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Antibiotic => write!(f, "Antibiotic"),
            Self::Nsaid => write!(f, "NSAID"),
            Self::Steroid => write!(f, "Steroid"),
        }
    }
}

/// One prescribable item in a patient's regimen.
///
/// Fixed-dose kinds (antibiotic, NSAID) use `active_window_weeks` and
/// `daily_frequency`; tapered kinds (steroid, combination products) use
/// `taper_schedule`. Absent fields deserialize to their inactive defaults
/// so a sparse remote record still loads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MedicationSpec {
    pub id: String,
    pub name: String,
    pub kind: MedicationKind,

    /// How many weeks post-op this item applies (fixed-dose kinds)
    #[serde(default)]
    pub active_window_weeks: u32,

    /// Fixed doses per day (fixed-dose kinds)
    #[serde(default)]
    pub daily_frequency: u32,

    /// Doses per day for each post-op week; index 0 = week of surgery
    #[serde(default)]
    pub taper_schedule: Option<Vec<u32>>,

    /// Antibiotic and NSAID are folded into this combination product
    /// and are not tracked separately
    #[serde(default)]
    pub is_combination: bool,

    /// No take-home drops were prescribed; disables all dose tracking
    #[serde(default)]
    pub is_dropless: bool,
}

// ============================================================================
// Recovery Context
// ============================================================================

/// Where the patient sits on the recovery timeline. Derived from
/// wall-clock time and the surgery date on every use; never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecoveryContext {
    /// Whole days since surgery; negative while the surgery is ahead
    pub day_offset: i64,

    /// `floor(day_offset / 7)`; only meaningful when `day_offset >= 0`
    pub week_index: i64,

    /// Healing estimate, saturating at 0 and 100
    pub healing_percent: f64,
}

impl RecoveryContext {
    /// True while the surgery has not happened yet.
    pub fn is_preop(&self) -> bool {
        self.day_offset < 0
    }
}

// ============================================================================
// Adherence Keys
// ============================================================================

/// ISO `YYYY-MM-DD` key identifying one tracked calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse back into a calendar date. Keys written by this crate
    /// always parse; foreign keys may not.
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `"{medication_id}_{dose_index}"` key identifying one trackable dose
/// slot within a day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    /// Dose indices are zero-based.
    pub fn new(medication_id: &str, dose_index: u32) -> Self {
        SlotKey(format!("{}_{}", medication_id, dose_index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Today's Checklist
// ============================================================================

/// One medication due today, with its dose requirement and progress
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TodayMedication {
    pub id: String,
    pub name: String,
    pub kind: MedicationKind,
    pub is_combination: bool,

    /// Doses required today; always > 0 (zero-dose items are omitted)
    pub frequency: u32,

    /// Display string, e.g. "3x Daily" or "2x Daily (Week 3)"
    pub label: String,

    pub done_count: u32,
    pub progress_percent: f64,
}

impl TodayMedication {
    /// Every required dose for today has been marked taken.
    pub fn is_complete(&self) -> bool {
        self.done_count >= self.frequency
    }

    pub fn type_label(&self) -> &'static str {
        if self.is_combination {
            "Combination"
        } else {
            match self.kind {
                MedicationKind::Antibiotic => "Antibiotic",
                MedicationKind::Nsaid => "NSAID",
                MedicationKind::Steroid => "Steroid",
            }
        }
    }
}

// ============================================================================
// Patient Record
// ============================================================================

/// The single patient's record as held by the backing store. Every
/// persisted change replaces the whole record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub patient_id: Uuid,
    pub surgery_date: NaiveDate,
    pub regimen: Vec<MedicationSpec>,
    #[serde(default)]
    pub progress: crate::adherence::AdherenceLog,
}
