//! Session facade over the resolvers, the adherence log, and the sync
//! controller.
//!
//! The surrounding UI layer talks to `RecoveryTracker` alone: load the
//! record once at mount, then resolve everything per call from
//! wall-clock input, and toggle doses through the optimistic sync
//! protocol.

use crate::{
    calendar, regimen, AdherenceLog, DateKey, RecordStore, RecoveryContext, Result, SlotKey,
    SyncController, TodayMedication,
};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// One patient's in-session tracker.
pub struct RecoveryTracker<S: RecordStore> {
    controller: SyncController<S>,
}

impl<S: RecordStore + 'static> RecoveryTracker<S> {
    /// Mount: fetch the patient record and seed the adherence state.
    pub async fn load(store: Arc<S>, patient_id: Uuid) -> Result<Self> {
        let record = store.load(patient_id).await?;
        tracing::info!(
            %patient_id,
            surgery_date = %record.surgery_date,
            medications = record.regimen.len(),
            "recovery tracker loaded"
        );

        Ok(Self {
            controller: SyncController::new(record, store),
        })
    }

    pub fn patient_id(&self) -> Uuid {
        self.controller.patient_id()
    }

    pub fn surgery_date(&self) -> NaiveDate {
        self.controller.surgery_date()
    }

    /// Recomputed from the given date on every call; nothing is cached.
    pub fn context(&self, today: NaiveDate) -> RecoveryContext {
        calendar::recovery_context(today, self.controller.surgery_date())
    }

    pub fn healing_percent(&self, today: NaiveDate) -> f64 {
        self.context(today).healing_percent
    }

    /// Today's dose checklist against the current visible log.
    pub fn today_medications(&self, today: NaiveDate) -> Vec<TodayMedication> {
        let ctx = self.context(today);
        let log = self.controller.visible_log();
        let date = DateKey::from(today);
        regimen::resolve_today(self.controller.regimen(), &ctx, log.day(&date))
    }

    /// Flip one dose slot. The visible state changes before this
    /// returns; drive the returned future to persist (a failure rolls
    /// the slot back and is safe to report without blocking input).
    pub fn toggle_dose(
        &self,
        today: NaiveDate,
        medication_id: &str,
        dose_index: u32,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        self.controller
            .toggle_and_sync(DateKey::from(today), SlotKey::new(medication_id, dose_index))
    }

    /// Current UI-visible adherence state.
    pub fn visible_log(&self) -> AdherenceLog {
        self.controller.visible_log()
    }
}
