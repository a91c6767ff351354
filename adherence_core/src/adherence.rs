//! Per-day adherence log.
//!
//! A map from calendar day to dose-slot booleans. The log has no
//! opinion about slot legality or historical days; the regimen
//! resolver defines the slot space for any given day.

use crate::{DateKey, SlotKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which doses have been marked taken, per day.
///
/// Toggling flips a slot in a fresh copy of the log; slots are
/// append-only and never removed once written. Missing slots read as
/// not taken, so a written `false` and an absent slot are
/// observationally the same.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AdherenceLog {
    days: HashMap<DateKey, HashMap<SlotKey, bool>>,
}

impl AdherenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot map for one day, if anything was ever recorded for it.
    pub fn day(&self, date: &DateKey) -> Option<&HashMap<SlotKey, bool>> {
        self.days.get(date)
    }

    pub fn slot_taken(&self, date: &DateKey, slot: &SlotKey) -> bool {
        self.days
            .get(date)
            .and_then(|slots| slots.get(slot))
            .copied()
            .unwrap_or(false)
    }

    /// Return a new log with the slot's boolean flipped. A slot that
    /// was never written toggles to `true`.
    #[must_use]
    pub fn toggle(&self, date: &DateKey, slot: &SlotKey) -> AdherenceLog {
        let mut next = self.clone();
        let slots = next.days.entry(date.clone()).or_default();
        let flipped = !slots.get(slot).copied().unwrap_or(false);
        slots.insert(slot.clone(), flipped);
        next
    }

    /// Days with at least one recorded slot, in arbitrary order.
    pub fn recorded_days(&self) -> impl Iterator<Item = &DateKey> {
        self.days.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DateKey {
        DateKey::from(chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn test_unseen_date_reads_empty() {
        let log = AdherenceLog::new();
        let d = date("2025-03-10");
        assert!(log.day(&d).is_none());
        assert!(!log.slot_taken(&d, &SlotKey::new("ketorolac", 0)));
    }

    #[test]
    fn test_toggle_sets_missing_slot_true() {
        let log = AdherenceLog::new();
        let d = date("2025-03-10");
        let slot = SlotKey::new("ketorolac", 0);

        let next = log.toggle(&d, &slot);
        assert!(next.slot_taken(&d, &slot));
        // The original log is untouched.
        assert!(!log.slot_taken(&d, &slot));
    }

    #[test]
    fn test_double_toggle_is_identity_observationally() {
        let log = AdherenceLog::new();
        let d = date("2025-03-10");
        let slot = SlotKey::new("ketorolac", 1);

        let twice = log.toggle(&d, &slot).toggle(&d, &slot);
        assert_eq!(twice.slot_taken(&d, &slot), log.slot_taken(&d, &slot));

        // The slot is flipped back, not removed.
        assert_eq!(twice.day(&d).unwrap().get(&slot), Some(&false));
    }

    #[test]
    fn test_toggles_are_isolated() {
        let d1 = date("2025-03-10");
        let d2 = date("2025-03-11");
        let a = SlotKey::new("ketorolac", 0);
        let b = SlotKey::new("prednisolone", 0);

        let log = AdherenceLog::new()
            .toggle(&d1, &a)
            .toggle(&d1, &b)
            .toggle(&d2, &a);

        assert!(log.slot_taken(&d1, &a));
        assert!(log.slot_taken(&d1, &b));
        assert!(log.slot_taken(&d2, &a));
        assert!(!log.slot_taken(&d2, &b));

        let without_b = log.toggle(&d1, &b);
        assert!(!without_b.slot_taken(&d1, &b));
        assert!(without_b.slot_taken(&d1, &a));
        assert!(without_b.slot_taken(&d2, &a));
    }

    #[test]
    fn test_serde_roundtrip() {
        let d = date("2025-03-10");
        let slot = SlotKey::new("moxifloxacin", 2);
        let log = AdherenceLog::new().toggle(&d, &slot);

        let json = serde_json::to_string(&log).unwrap();
        let back: AdherenceLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
