//! Built-in post-operative regimen courses.
//!
//! Three variants cover the usual discharge orders: the standard
//! three-bottle course, a single combination drop, and the dropless
//! protocol (intraoperative depot, nothing to track at home).

use crate::config::RegimenDefaults;
use crate::{MedicationKind, MedicationSpec};
use once_cell::sync::Lazy;
use std::str::FromStr;

/// Cached standard course with default parameters - built once and
/// reused across all operations
static STANDARD_REGIMEN: Lazy<Vec<MedicationSpec>> =
    Lazy::new(|| build_regimen(RegimenVariant::Standard, &RegimenDefaults::default()));

/// Get a reference to the cached standard three-bottle course.
///
/// For parameterized courses, use [`build_regimen`] with the
/// `[regimen]` section of the loaded config.
pub fn standard_regimen() -> &'static [MedicationSpec] {
    &STANDARD_REGIMEN
}

/// Which discharge course to build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegimenVariant {
    Standard,
    Combination,
    Dropless,
}

impl FromStr for RegimenVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "combination" | "combo" => Ok(Self::Combination),
            "dropless" => Ok(Self::Dropless),
            other => Err(format!(
                "unknown regimen variant '{}' (expected standard, combination, or dropless)",
                other
            )),
        }
    }
}

/// Build a discharge course from one of the built-in variants.
pub fn build_regimen(variant: RegimenVariant, defaults: &RegimenDefaults) -> Vec<MedicationSpec> {
    match variant {
        RegimenVariant::Standard => vec![
            MedicationSpec {
                id: "moxifloxacin".into(),
                name: "Moxifloxacin 0.5%".into(),
                kind: MedicationKind::Antibiotic,
                active_window_weeks: defaults.antibiotic_window_weeks,
                daily_frequency: defaults.antibiotic_daily_doses,
                taper_schedule: None,
                is_combination: false,
                is_dropless: false,
            },
            MedicationSpec {
                id: "ketorolac".into(),
                name: "Ketorolac 0.5%".into(),
                kind: MedicationKind::Nsaid,
                active_window_weeks: defaults.nsaid_window_weeks,
                daily_frequency: defaults.nsaid_daily_doses,
                taper_schedule: None,
                is_combination: false,
                is_dropless: false,
            },
            MedicationSpec {
                id: "prednisolone".into(),
                name: "Prednisolone Acetate 1%".into(),
                kind: MedicationKind::Steroid,
                active_window_weeks: 0,
                daily_frequency: 0,
                taper_schedule: Some(defaults.steroid_taper.clone()),
                is_combination: false,
                is_dropless: false,
            },
        ],

        RegimenVariant::Combination => vec![MedicationSpec {
            id: "combo_drop".into(),
            name: "Prednisolone-Moxifloxacin-Ketorolac".into(),
            kind: MedicationKind::Steroid,
            active_window_weeks: 0,
            daily_frequency: 0,
            taper_schedule: Some(defaults.steroid_taper.clone()),
            is_combination: true,
            is_dropless: false,
        }],

        RegimenVariant::Dropless => vec![MedicationSpec {
            id: "dropless".into(),
            name: "Intraoperative Depot (Dropless)".into(),
            kind: MedicationKind::Steroid,
            active_window_weeks: 0,
            daily_frequency: 0,
            taper_schedule: None,
            is_combination: false,
            is_dropless: true,
        }],
    }
}

/// Configuration gaps in a regimen; an empty list means valid.
///
/// Gaps are reported rather than raised: a broken item resolves as
/// inactive at runtime, but init-time callers want to know.
pub fn validate_regimen(specs: &[MedicationSpec]) -> Vec<String> {
    let mut errors = Vec::new();

    if specs.is_empty() {
        errors.push("regimen has no medications".into());
    }

    for (i, spec) in specs.iter().enumerate() {
        if spec.id.is_empty() {
            errors.push(format!("medication #{} has an empty id", i + 1));
        }
        if specs[..i].iter().any(|other| other.id == spec.id) {
            errors.push(format!("duplicate medication id '{}'", spec.id));
        }

        if spec.is_dropless {
            continue;
        }

        match spec.kind {
            MedicationKind::Antibiotic | MedicationKind::Nsaid => {
                if spec.active_window_weeks == 0 || spec.daily_frequency == 0 {
                    errors.push(format!(
                        "'{}' has no active window or daily doses and will never be shown",
                        spec.id
                    ));
                }
            }
            MedicationKind::Steroid => match &spec.taper_schedule {
                None => errors.push(format!("'{}' has no taper schedule", spec.id)),
                Some(schedule) if schedule.iter().all(|&doses| doses == 0) => {
                    errors.push(format!("'{}' tapers to zero doses everywhere", spec.id))
                }
                Some(_) => {}
            },
        }
    }

    errors
}
