//! CSV adherence report.
//!
//! Replays the calendar and regimen resolvers over each recorded day
//! and writes one row per (day, medication). Days where a medication
//! was not due produce no row, matching what the checklist showed at
//! the time.

use crate::{calendar, regimen, PatientRecord, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    medication_id: String,
    medication: String,
    required: u32,
    taken: u32,
    percent: u32,
}

/// Write the adherence history of `record` to `path`, replacing any
/// existing file. Returns the number of rows written.
pub fn write_adherence_report(record: &PatientRecord, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut days: Vec<_> = record.progress.recorded_days().collect();
    days.sort();

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;

    for date_key in days {
        let date = match date_key.to_date() {
            Some(date) => date,
            None => {
                tracing::warn!(%date_key, "skipping unparseable day key in adherence log");
                continue;
            }
        };

        let ctx = calendar::recovery_context(date, record.surgery_date);
        let checklist = regimen::resolve_today(&record.regimen, &ctx, record.progress.day(date_key));

        for item in checklist {
            writer.serialize(CsvRow {
                date: date_key.to_string(),
                medication_id: item.id,
                medication: item.name,
                required: item.frequency,
                taken: item.done_count,
                percent: item.progress_percent.round() as u32,
            })?;
            rows += 1;
        }
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!(rows, path = %path.display(), "wrote adherence report");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{standard_regimen, AdherenceLog, DateKey, SlotKey};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record_with_progress() -> PatientRecord {
        let surgery = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let day0 = DateKey::from(surgery);
        let day9 = DateKey::from(surgery + chrono::Duration::days(9));

        let progress = AdherenceLog::new()
            .toggle(&day0, &SlotKey::new("moxifloxacin", 0))
            .toggle(&day0, &SlotKey::new("moxifloxacin", 1))
            .toggle(&day9, &SlotKey::new("ketorolac", 0));

        PatientRecord {
            patient_id: Uuid::new_v4(),
            surgery_date: surgery,
            regimen: standard_regimen().to_vec(),
            progress,
        }
    }

    #[test]
    fn test_report_rows_follow_the_resolvers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("adherence.csv");

        let rows = write_adherence_report(&record_with_progress(), &path).unwrap();
        // Day 0: antibiotic + NSAID + steroid. Day 9: NSAID + steroid
        // (antibiotic window is over).
        assert_eq!(rows, 5);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,medication_id,medication,required,taken,percent"));
        assert!(contents.contains("2025-03-01,moxifloxacin,Moxifloxacin 0.5%,3,2,67"));
        assert!(contents.contains("2025-03-10,ketorolac,Ketorolac 0.5%,3,1,33"));
        assert!(!contents.contains("2025-03-10,moxifloxacin"));
    }

    #[test]
    fn test_empty_history_still_writes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("adherence.csv");

        let mut record = record_with_progress();
        record.progress = AdherenceLog::new();

        let rows = write_adherence_report(&record, &path).unwrap();
        assert_eq!(rows, 0);
        assert!(path.exists());
    }
}
