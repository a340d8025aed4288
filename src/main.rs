use anyhow::anyhow;
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_core::config::patient_data_file_from_env_value;
use vitals_core::constants::PATIENT_DATA_FILE_ENV;
use vitals_core::{
    CoreConfig, DialogHandle, JsonFilePatientStore, Patient, PatientStore, SubmissionPipeline,
    SubmitOutcome, TracingNotificationSink, VitalsEditSession, VitalsField,
};
use vitals_types::PatientId;

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Edit and commit patient vital signs")]
struct Cli {
    /// Patient data file (overrides VITALS_PATIENT_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients with their current vitals
    List,
    /// Show one patient's current vitals
    Show {
        /// Patient identifier
        patient_id: PatientId,
    },
    /// Add a patient, or rename an existing one
    Add {
        /// Patient identifier
        patient_id: PatientId,
        /// Display name
        name: String,
    },
    /// Open a vitals session, apply edits, then submit or cancel
    Edit {
        /// Patient identifier
        patient_id: PatientId,
        /// Heart rate in bpm
        #[arg(long, allow_hyphen_values = true)]
        heart_rate: Option<String>,
        /// Blood pressure, e.g. 120/80
        #[arg(long, allow_hyphen_values = true)]
        blood_pressure: Option<String>,
        /// Temperature in °C
        #[arg(long, allow_hyphen_values = true)]
        temperature: Option<String>,
        /// Oxygen saturation in percent
        #[arg(long, allow_hyphen_values = true)]
        oxygen_sat: Option<String>,
        /// Discard the edits instead of submitting them
        #[arg(long)]
        cancel: bool,
    },
}

/// Entry point for the vitals CLI.
///
/// # Environment Variables
/// - `VITALS_PATIENT_DATA_FILE`: patient data file (default: "patient_data/patients.json")
/// - `RUST_LOG`: log filter (default directive: "vitals=info")
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vitals=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let data_file = cli
        .data_file
        .clone()
        .unwrap_or_else(|| patient_data_file_from_env_value(std::env::var(PATIENT_DATA_FILE_ENV).ok()));
    let cfg = CoreConfig::new(data_file)?;
    tracing::debug!("++ Using patient data file {}", cfg.patient_data_file().display());

    run(cli, &cfg, &mut std::io::stdout())
}

fn run(cli: Cli, cfg: &CoreConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let store = Arc::new(JsonFilePatientStore::new(cfg));

    match cli.command {
        Some(Commands::List) => {
            let patients = store.load()?;
            if patients.is_empty() {
                writeln!(out, "No patients found.")?;
            }
            for patient in patients {
                writeln!(out, "{}", describe(&patient))?;
            }
        }
        Some(Commands::Show { patient_id }) => {
            let patient = store
                .patient(&patient_id)?
                .ok_or_else(|| anyhow!("patient not found: {patient_id}"))?;
            writeln!(out, "{}", describe(&patient))?;
        }
        Some(Commands::Add { patient_id, name }) => {
            let vitals = store
                .patient(&patient_id)?
                .map(|existing| existing.vitals)
                .unwrap_or_default();
            store.insert(Patient {
                id: patient_id.clone(),
                name,
                vitals,
            })?;
            writeln!(out, "Saved patient {patient_id}")?;
        }
        Some(Commands::Edit {
            patient_id,
            heart_rate,
            blood_pressure,
            temperature,
            oxygen_sat,
            cancel,
        }) => {
            let pipeline = Arc::new(SubmissionPipeline::new(
                store,
                Arc::new(TracingNotificationSink),
            ));
            let mut session =
                VitalsEditSession::open_by_id(&patient_id, pipeline, Arc::new(DialogHandle::open()))?;
            writeln!(out, "{}", session.title())?;

            let edits = [
                (VitalsField::HeartRate, heart_rate),
                (VitalsField::BloodPressure, blood_pressure),
                (VitalsField::Temperature, temperature),
                (VitalsField::OxygenSat, oxygen_sat),
            ];
            for (field, raw) in edits {
                if let Some(raw) = raw {
                    session
                        .input(field, &raw)
                        .map_err(|e| anyhow!("{}: {e}", field.label()))?;
                }
            }

            if cancel {
                session.cancel();
                writeln!(out, "Cancelled; no vitals committed.")?;
                return Ok(());
            }

            if let SubmitOutcome::Committed(snapshot) = session.submit()? {
                writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            }
        }
        None => {
            writeln!(out, "Use 'vitals --help' for commands")?;
        }
    }

    Ok(())
}

fn describe(patient: &Patient) -> String {
    let number = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
    let vitals = &patient.vitals;

    format!(
        "ID: {}, Name: {}, HR: {} bpm, BP: {}, Temp: {} °C, SpO2: {} %, Recorded: {}",
        patient.id,
        patient.name,
        number(vitals.heart_rate),
        vitals.blood_pressure.as_deref().unwrap_or("-"),
        number(vitals.temperature),
        number(vitals.oxygen_sat),
        vitals
            .timestamp
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| "never".into()),
    )
}
