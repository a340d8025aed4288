//! Constants used throughout the vitals core crate.
//!
//! User-facing literals live here so the dialog, the pipeline and the tests agree on
//! the exact text.

/// Title of the notification sent after a successful commit.
pub const SUCCESS_TITLE: &str = "Success";

/// Body of the notification sent after a successful commit.
pub const SUCCESS_MESSAGE: &str = "Vitals updated successfully";

/// Title of the notification sent when the store rejects a commit.
pub const FAILURE_TITLE: &str = "Error";

/// Body of the notification sent when the store rejects a commit.
pub const FAILURE_MESSAGE: &str = "Failed to update vitals";

/// Prefix of the dialog title; the patient's name follows.
pub const DIALOG_TITLE_PREFIX: &str = "Update Vitals - ";

/// Placeholder shown in the empty blood pressure input.
pub const BLOOD_PRESSURE_PLACEHOLDER: &str = "120/80";

/// Input step for the temperature field.
pub const TEMPERATURE_STEP: f64 = 0.1;

/// Default location of the patient data file when no explicit path is configured.
pub const DEFAULT_PATIENT_DATA_FILE: &str = "patient_data/patients.json";

/// Environment variable overriding [`DEFAULT_PATIENT_DATA_FILE`].
pub const PATIENT_DATA_FILE_ENV: &str = "VITALS_PATIENT_DATA_FILE";
