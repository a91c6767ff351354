//! Patient record persistence.
//!
//! `RecordStore` is the seam to whatever transport the surrounding
//! application uses: one load at mount time, whole-record replacement
//! on every change. `JsonRecordStore` is the file-backed
//! implementation, with file locking and atomic replacement.

use crate::{Error, PatientRecord, Result};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Backing store for the single patient's record.
///
/// Writes are idempotent full-state replacements keyed by patient id,
/// so no locking discipline is required of implementations beyond
/// their own internal consistency.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the record, verifying it belongs to `patient_id`.
    async fn load(&self, patient_id: Uuid) -> Result<PatientRecord>;

    /// Replace the stored record with `record`.
    async fn save(&self, record: &PatientRecord) -> Result<()>;
}

/// JSON-file-backed record store with fs2 locking.
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record without an identity check (the CLI uses this to
    /// discover the patient id before mounting a tracker).
    pub fn read(&self) -> Result<PatientRecord> {
        if !self.path.exists() {
            return Err(Error::Record(format!(
                "no patient record at {}",
                self.path.display()
            )));
        }

        let file = File::open(&self.path)?;

        // Shared lock for reading
        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        serde_json::from_str(&contents).map_err(|e| {
            Error::Record(format!(
                "unreadable patient record {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Atomically replace the record file:
    /// 1. Write to a locked temp file in the same directory
    /// 2. Sync it to disk
    /// 3. Rename over the original
    fn write(&self, record: &PatientRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "record path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(record)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), "saved patient record");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn load(&self, patient_id: Uuid) -> Result<PatientRecord> {
        let record = self.read()?;
        if record.patient_id != patient_id {
            return Err(Error::Record(format!(
                "record at {} belongs to patient {}, not {}",
                self.path.display(),
                record.patient_id,
                patient_id
            )));
        }

        tracing::debug!(%patient_id, "loaded patient record");
        Ok(record)
    }

    async fn save(&self, record: &PatientRecord) -> Result<()> {
        self.write(record)
    }
}
