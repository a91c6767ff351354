//! Regimen resolution: which doses are due today.
//!
//! This module implements the exclusion ladder:
//! - Pre-op → nothing is active
//! - Dropless regimen → nothing is tracked, ever
//! - Combination product → antibiotic and NSAID are suppressed
//! - Fixed-dose items show while inside their active window
//! - Tapered items show while the per-week schedule has doses left

use crate::{MedicationKind, MedicationSpec, RecoveryContext, SlotKey, TodayMedication};
use std::collections::HashMap;

/// Resolve the ordered dose checklist for today.
///
/// Display order is fixed: antibiotic, NSAID, steroid/combination.
/// Items requiring no doses today are omitted entirely rather than
/// shown with zero slots. Pure: same inputs always give the same list.
pub fn resolve_today(
    specs: &[MedicationSpec],
    ctx: &RecoveryContext,
    progress_today: Option<&HashMap<SlotKey, bool>>,
) -> Vec<TodayMedication> {
    if ctx.is_preop() {
        tracing::debug!(day_offset = ctx.day_offset, "pre-op, no active medications");
        return Vec::new();
    }

    if specs.iter().any(|s| s.is_dropless) {
        tracing::debug!("dropless regimen, dose tracking disabled");
        return Vec::new();
    }

    let combined = specs.iter().any(|s| s.is_combination);
    let mut today = Vec::new();

    if !combined {
        for kind in [MedicationKind::Antibiotic, MedicationKind::Nsaid] {
            if let Some(spec) = first_of_kind(specs, kind) {
                if let Some(item) = fixed_dose_item(spec, ctx, progress_today) {
                    today.push(item);
                }
            }
        }
    }

    if let Some(spec) = first_of_kind(specs, MedicationKind::Steroid) {
        if let Some(item) = tapered_item(spec, ctx, progress_today) {
            today.push(item);
        }
    }

    today
}

fn first_of_kind(specs: &[MedicationSpec], kind: MedicationKind) -> Option<&MedicationSpec> {
    specs.iter().find(|s| s.kind == kind)
}

/// Antibiotic/NSAID: a fixed daily dose while inside the active window.
fn fixed_dose_item(
    spec: &MedicationSpec,
    ctx: &RecoveryContext,
    progress_today: Option<&HashMap<SlotKey, bool>>,
) -> Option<TodayMedication> {
    let window_days = i64::from(spec.active_window_weeks) * 7;
    if ctx.day_offset >= window_days || spec.daily_frequency == 0 {
        return None;
    }

    let label = format!("{}x Daily", spec.daily_frequency);
    Some(build_item(spec, spec.daily_frequency, label, progress_today))
}

/// Steroid/combination: the dose comes from the per-week taper.
///
/// An exhausted schedule or a zero entry means the course is finished,
/// not an error. A steroid item with no schedule at all is a
/// configuration gap and resolves as inactive.
fn tapered_item(
    spec: &MedicationSpec,
    ctx: &RecoveryContext,
    progress_today: Option<&HashMap<SlotKey, bool>>,
) -> Option<TodayMedication> {
    let schedule = match &spec.taper_schedule {
        Some(schedule) => schedule,
        None => {
            tracing::warn!(id = %spec.id, "tapered item without a schedule, treating as inactive");
            return None;
        }
    };

    let week = usize::try_from(ctx.week_index).ok()?;
    let frequency = schedule.get(week).copied().unwrap_or(0);
    if frequency == 0 {
        return None;
    }

    let label = format!("{}x Daily (Week {})", frequency, ctx.week_index + 1);
    Some(build_item(spec, frequency, label, progress_today))
}

/// Callers guarantee `frequency > 0`.
fn build_item(
    spec: &MedicationSpec,
    frequency: u32,
    label: String,
    progress_today: Option<&HashMap<SlotKey, bool>>,
) -> TodayMedication {
    let done_count = (0..frequency)
        .filter(|i| {
            progress_today
                .and_then(|p| p.get(&SlotKey::new(&spec.id, *i)))
                .copied()
                .unwrap_or(false)
        })
        .count() as u32;

    TodayMedication {
        id: spec.id.clone(),
        name: spec.name.clone(),
        kind: spec.kind,
        is_combination: spec.is_combination,
        frequency,
        label,
        done_count,
        progress_percent: f64::from(done_count) / f64::from(frequency) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery_context;
    use chrono::NaiveDate;

    fn antibiotic(window_weeks: u32, daily: u32) -> MedicationSpec {
        MedicationSpec {
            id: "moxifloxacin".into(),
            name: "Moxifloxacin 0.5%".into(),
            kind: MedicationKind::Antibiotic,
            active_window_weeks: window_weeks,
            daily_frequency: daily,
            taper_schedule: None,
            is_combination: false,
            is_dropless: false,
        }
    }

    fn nsaid(window_weeks: u32, daily: u32) -> MedicationSpec {
        MedicationSpec {
            id: "ketorolac".into(),
            name: "Ketorolac 0.5%".into(),
            kind: MedicationKind::Nsaid,
            active_window_weeks: window_weeks,
            daily_frequency: daily,
            taper_schedule: None,
            is_combination: false,
            is_dropless: false,
        }
    }

    fn steroid(taper: &[u32]) -> MedicationSpec {
        MedicationSpec {
            id: "prednisolone".into(),
            name: "Prednisolone Acetate 1%".into(),
            kind: MedicationKind::Steroid,
            active_window_weeks: 0,
            daily_frequency: 0,
            taper_schedule: Some(taper.to_vec()),
            is_combination: false,
            is_dropless: false,
        }
    }

    fn ctx_at_offset(day_offset: i64) -> RecoveryContext {
        let surgery = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        recovery_context(surgery + chrono::Duration::days(day_offset), surgery)
    }

    fn standard() -> Vec<MedicationSpec> {
        vec![antibiotic(1, 3), nsaid(4, 3), steroid(&[4, 3, 2, 1])]
    }

    #[test]
    fn test_preop_is_empty_regardless_of_specs() {
        for offset in [-30, -7, -1] {
            let today = resolve_today(&standard(), &ctx_at_offset(offset), None);
            assert!(today.is_empty(), "offset {} should be empty", offset);
        }
    }

    #[test]
    fn test_dropless_overrides_everything() {
        let mut specs = standard();
        specs.push(MedicationSpec {
            id: "dropless".into(),
            name: "Intraoperative Depot".into(),
            kind: MedicationKind::Steroid,
            active_window_weeks: 0,
            daily_frequency: 0,
            taper_schedule: None,
            is_combination: false,
            is_dropless: true,
        });

        for offset in [0, 9, 100] {
            assert!(resolve_today(&specs, &ctx_at_offset(offset), None).is_empty());
        }
    }

    #[test]
    fn test_combination_suppresses_antibiotic_and_nsaid() {
        let mut combo = steroid(&[4, 3, 2, 1]);
        combo.id = "combo_drop".into();
        combo.is_combination = true;
        // Antibiotic and NSAID are well-formed and inside their windows.
        let specs = vec![antibiotic(4, 3), nsaid(4, 3), combo];

        let today = resolve_today(&specs, &ctx_at_offset(2), None);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, "combo_drop");
        assert!(today[0].is_combination);
        assert_eq!(today[0].type_label(), "Combination");
    }

    #[test]
    fn test_active_window_cutoffs_at_day_nine() {
        // Day 9: antibiotic window (1 week) is over, NSAID (4 weeks) is not.
        let today = resolve_today(&standard(), &ctx_at_offset(9), None);

        let ids: Vec<&str> = today.iter().map(|m| m.id.as_str()).collect();
        assert!(!ids.contains(&"moxifloxacin"));
        assert!(ids.contains(&"ketorolac"));
    }

    #[test]
    fn test_taper_week_resolution() {
        // Week 2 of [4, 3, 2, 1] → 2 doses.
        let today = resolve_today(&standard(), &ctx_at_offset(15), None);
        let item = today.iter().find(|m| m.id == "prednisolone").unwrap();
        assert_eq!(item.frequency, 2);
        assert_eq!(item.label, "2x Daily (Week 3)");
    }

    #[test]
    fn test_exhausted_taper_is_omitted() {
        // Week 5 with a 4-entry schedule → finished, not an error.
        let today = resolve_today(&standard(), &ctx_at_offset(36), None);
        assert!(today.iter().all(|m| m.id != "prednisolone"));
    }

    #[test]
    fn test_zero_taper_entry_is_omitted() {
        let specs = vec![steroid(&[2, 0, 1])];
        let today = resolve_today(&specs, &ctx_at_offset(8), None);
        assert!(today.is_empty());
    }

    #[test]
    fn test_steroid_without_schedule_is_inactive() {
        let mut broken = steroid(&[]);
        broken.taper_schedule = None;
        let today = resolve_today(&[broken], &ctx_at_offset(3), None);
        assert!(today.is_empty());
    }

    #[test]
    fn test_zero_window_or_zero_frequency_never_shows() {
        let specs = vec![antibiotic(0, 3), nsaid(4, 0)];
        let today = resolve_today(&specs, &ctx_at_offset(0), None);
        assert!(today.is_empty());
    }

    #[test]
    fn test_display_order_is_fixed() {
        let today = resolve_today(&standard(), &ctx_at_offset(2), None);
        let kinds: Vec<MedicationKind> = today.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MedicationKind::Antibiotic,
                MedicationKind::Nsaid,
                MedicationKind::Steroid
            ]
        );
    }

    #[test]
    fn test_done_count_and_completion() {
        let mut progress = HashMap::new();
        progress.insert(SlotKey::new("prednisolone", 0), true);
        progress.insert(SlotKey::new("prednisolone", 1), true);
        // An out-of-range slot never counts.
        progress.insert(SlotKey::new("prednisolone", 7), true);

        // Week 2 → 2 doses, both taken.
        let today = resolve_today(&standard(), &ctx_at_offset(15), Some(&progress));
        let item = today.iter().find(|m| m.id == "prednisolone").unwrap();
        assert_eq!(item.done_count, 2);
        assert_eq!(item.progress_percent, 100.0);
        assert!(item.is_complete());
    }

    #[test]
    fn test_false_and_missing_slots_do_not_count() {
        let mut progress = HashMap::new();
        progress.insert(SlotKey::new("ketorolac", 0), true);
        progress.insert(SlotKey::new("ketorolac", 1), false);

        let today = resolve_today(&standard(), &ctx_at_offset(2), Some(&progress));
        let item = today.iter().find(|m| m.id == "ketorolac").unwrap();
        assert_eq!(item.frequency, 3);
        assert_eq!(item.done_count, 1);
        assert!(!item.is_complete());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let ctx = ctx_at_offset(9);
        let specs = standard();
        let first = resolve_today(&specs, &ctx, None);
        let second = resolve_today(&specs, &ctx, None);
        assert_eq!(first, second);
    }
}
