//! Optimistic toggle with best-effort persistence.
//!
//! A toggle flips the visible log synchronously, then persistence of
//! the full record snapshot runs as its own future. Success promotes
//! the snapshot to the confirmed log; failure restores the failed slot
//! alone, to the value snapshotted just before the optimistic flip,
//! leaving toggles issued in the meantime intact.

use crate::{
    AdherenceLog, DateKey, Error, MedicationSpec, PatientRecord, RecordStore, Result, SlotKey,
};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// The UI-visible log next to the last state the store acknowledged.
#[derive(Debug)]
struct LogPair {
    visible: AdherenceLog,
    confirmed: AdherenceLog,
}

fn lock(logs: &Mutex<LogPair>) -> MutexGuard<'_, LogPair> {
    logs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Orchestrates optimistic local mutation and remote reconciliation
/// for one patient's adherence log.
///
/// Toggles are independent fire-and-forget writes; there is no queue,
/// no coalescing, and no cancellation. Each persist carries the full
/// record snapshot taken at its own call time, and late completions
/// apply their confirm/rollback against the then-current state.
pub struct SyncController<S: RecordStore> {
    patient_id: Uuid,
    surgery_date: NaiveDate,
    regimen: Vec<MedicationSpec>,
    logs: Arc<Mutex<LogPair>>,
    store: Arc<S>,
}

impl<S: RecordStore + 'static> SyncController<S> {
    /// The loaded record's progress seeds both the visible and the
    /// confirmed log.
    pub fn new(record: PatientRecord, store: Arc<S>) -> Self {
        let PatientRecord {
            patient_id,
            surgery_date,
            regimen,
            progress,
        } = record;

        Self {
            patient_id,
            surgery_date,
            regimen,
            logs: Arc::new(Mutex::new(LogPair {
                visible: progress.clone(),
                confirmed: progress,
            })),
            store,
        }
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn surgery_date(&self) -> NaiveDate {
        self.surgery_date
    }

    pub fn regimen(&self) -> &[MedicationSpec] {
        &self.regimen
    }

    /// Current UI-visible adherence state.
    pub fn visible_log(&self) -> AdherenceLog {
        lock(&self.logs).visible.clone()
    }

    /// Last adherence state the store acknowledged.
    pub fn confirmed_log(&self) -> AdherenceLog {
        lock(&self.logs).confirmed.clone()
    }

    /// Flip one slot and hand back the persistence step.
    ///
    /// The visible log is already updated when this function returns;
    /// the returned future performs the remote write and must be
    /// driven (awaited or spawned) for confirm/rollback to apply. The
    /// slot's pre-toggle value is snapshotted here so a failure rolls
    /// back exactly this slot and nothing else. A persistence failure
    /// is reported but never fatal: the caller can keep toggling.
    pub fn toggle_and_sync(
        &self,
        date: DateKey,
        slot: SlotKey,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        let (snapshot, prior) = {
            let mut logs = lock(&self.logs);
            let prior = logs.visible.slot_taken(&date, &slot);
            logs.visible = logs.visible.toggle(&date, &slot);
            (logs.visible.clone(), prior)
        };
        tracing::debug!(%date, %slot, "optimistic toggle applied");

        let record = PatientRecord {
            patient_id: self.patient_id,
            surgery_date: self.surgery_date,
            regimen: self.regimen.clone(),
            progress: snapshot.clone(),
        };
        let logs = Arc::clone(&self.logs);
        let store = Arc::clone(&self.store);

        async move {
            match store.save(&record).await {
                Ok(()) => {
                    lock(&logs).confirmed = snapshot;
                    tracing::debug!(%date, %slot, "toggle confirmed");
                    Ok(())
                }
                Err(e) => {
                    let mut logs = lock(&logs);
                    if logs.visible.slot_taken(&date, &slot) != prior {
                        logs.visible = logs.visible.toggle(&date, &slot);
                    }
                    tracing::warn!(%date, %slot, error = %e, "persist failed, toggle reverted");
                    Err(Error::Persistence(format!(
                        "failed to persist toggle for {}: {}",
                        slot, e
                    )))
                }
            }
        }
    }
}
