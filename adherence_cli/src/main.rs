use adherence_core::*;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "postop")]
#[command(about = "Post-operative medication adherence tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Resolve against this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the patient record for a new recovery
    Init {
        /// Surgery date (YYYY-MM-DD)
        #[arg(long)]
        surgery_date: NaiveDate,

        /// Discharge course: standard, combination, dropless
        #[arg(long, default_value = "standard")]
        regimen: RegimenVariant,

        /// Patient identifier; generated when omitted
        #[arg(long)]
        patient_id: Option<Uuid>,

        /// Replace an existing record
        #[arg(long)]
        force: bool,
    },

    /// Show today's dose checklist (default)
    Today,

    /// Mark one dose taken, or un-mark it if already taken
    Take {
        /// Medication id as shown by `today`
        medication: String,

        /// Dose number, 1-based as shown by `today`
        dose: u32,
    },

    /// Export the adherence history to CSV
    Export {
        /// Output file (defaults to adherence.csv in the data dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    adherence_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory and the resolution date
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let record_path = data_dir.join("patient.json");

    match cli.command {
        Some(Commands::Init {
            surgery_date,
            regimen,
            patient_id,
            force,
        }) => cmd_init(record_path, surgery_date, regimen, patient_id, force, &config).await,
        Some(Commands::Take { medication, dose }) => {
            cmd_take(record_path, today, &medication, dose).await
        }
        Some(Commands::Export { out }) => {
            cmd_export(record_path, out.unwrap_or_else(|| data_dir.join("adherence.csv")))
        }
        Some(Commands::Today) | None => cmd_today(record_path, today).await,
    }
}

async fn cmd_init(
    record_path: PathBuf,
    surgery_date: NaiveDate,
    variant: RegimenVariant,
    patient_id: Option<Uuid>,
    force: bool,
    config: &Config,
) -> Result<()> {
    if record_path.exists() && !force {
        return Err(Error::Record(format!(
            "a patient record already exists at {} (use --force to replace it)",
            record_path.display()
        )));
    }

    let regimen = build_regimen(variant, &config.regimen);
    let errors = validate_regimen(&regimen);
    if !errors.is_empty() {
        eprintln!("Regimen validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::RegimenValidation("Invalid regimen".into()));
    }

    let record = PatientRecord {
        patient_id: patient_id.unwrap_or_else(Uuid::new_v4),
        surgery_date,
        regimen,
        progress: AdherenceLog::new(),
    };

    let store = JsonRecordStore::new(&record_path);
    store.save(&record).await?;

    println!("✓ Patient record created");
    println!("  Patient: {}", record.patient_id);
    println!("  Surgery: {}", record.surgery_date);
    println!("  Medications: {}", record.regimen.len());
    println!("  Record: {}", record_path.display());

    Ok(())
}

async fn cmd_today(record_path: PathBuf, today: NaiveDate) -> Result<()> {
    let tracker = mount(record_path).await?;
    let ctx = tracker.context(today);
    let checklist = tracker.today_medications(today);
    let log = tracker.visible_log();
    let date = DateKey::from(today);

    display_today(&ctx, &checklist, log.day(&date));
    Ok(())
}

async fn cmd_take(
    record_path: PathBuf,
    today: NaiveDate,
    medication: &str,
    dose: u32,
) -> Result<()> {
    if dose == 0 {
        return Err(Error::Other("dose numbers start at 1".into()));
    }

    let tracker = mount(record_path).await?;
    let checklist = tracker.today_medications(today);

    let item = checklist
        .iter()
        .find(|m| m.id == medication)
        .ok_or_else(|| {
            Error::Other(format!(
                "'{}' is not due today (run `postop today` for the checklist)",
                medication
            ))
        })?;

    if dose > item.frequency {
        return Err(Error::Other(format!(
            "'{}' has {} doses today, not {}",
            medication, item.frequency, dose
        )));
    }

    let dose_index = dose - 1;
    match tracker.toggle_dose(today, medication, dose_index).await {
        Ok(()) => {
            let taken = tracker
                .visible_log()
                .slot_taken(&DateKey::from(today), &SlotKey::new(medication, dose_index));
            if taken {
                println!("✓ Dose {} of {} recorded", dose, item.name);
            } else {
                println!("✓ Dose {} of {} cleared", dose, item.name);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("! Could not save; the change was rolled back");
            Err(e)
        }
    }
}

fn cmd_export(record_path: PathBuf, out: PathBuf) -> Result<()> {
    let record = JsonRecordStore::new(&record_path).read()?;
    let rows = write_adherence_report(&record, &out)?;

    println!("✓ Exported {} adherence rows", rows);
    println!("  CSV: {}", out.display());
    Ok(())
}

async fn mount(record_path: PathBuf) -> Result<RecoveryTracker<JsonRecordStore>> {
    let store = JsonRecordStore::new(record_path);
    let record = store.read()?;
    RecoveryTracker::load(Arc::new(store), record.patient_id).await
}

fn display_today(
    ctx: &RecoveryContext,
    checklist: &[TodayMedication],
    progress: Option<&std::collections::HashMap<SlotKey, bool>>,
) {
    println!("\n╭─────────────────────────────────────────╮");
    if ctx.is_preop() {
        println!("│  PRE-OP COUNTDOWN");
    } else {
        println!("│  RECOVERY — DAY {} (WEEK {})", ctx.day_offset, ctx.week_index + 1);
    }
    println!("╰─────────────────────────────────────────╯");
    println!();

    if ctx.is_preop() {
        println!("  Surgery in {} day(s) — no medications yet.", -ctx.day_offset);
        println!();
        return;
    }

    println!("  Healing: {:.0}%", ctx.healing_percent);
    println!();

    if checklist.is_empty() {
        println!("  No doses due today.");
        println!();
        return;
    }

    for item in checklist {
        let slots: String = (0..item.frequency)
            .map(|i| {
                let taken = progress
                    .and_then(|p| p.get(&SlotKey::new(&item.id, i)))
                    .copied()
                    .unwrap_or(false);
                if taken {
                    format!("[{} ✓] ", i + 1)
                } else {
                    format!("[{} ·] ", i + 1)
                }
            })
            .collect();

        println!("  {}{} — {}, {}", slots, item.name, item.type_label(), item.label);
        if item.is_complete() {
            println!("      all doses taken today");
        }
        println!("      id: {}", item.id);
    }

    println!();
}
