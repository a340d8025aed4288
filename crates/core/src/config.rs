//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! services. Nothing in the core reads environment variables while handling an edit
//! or a submit.

use crate::constants::DEFAULT_PATIENT_DATA_FILE;
use crate::{VitalsError, VitalsResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_file: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::InvalidInput`] if `patient_data_file` is empty or names a
    /// directory.
    pub fn new(patient_data_file: PathBuf) -> VitalsResult<Self> {
        if patient_data_file.as_os_str().is_empty() {
            return Err(VitalsError::InvalidInput(
                "patient_data_file cannot be empty".into(),
            ));
        }
        if patient_data_file.is_dir() {
            return Err(VitalsError::InvalidInput(format!(
                "patient_data_file must be a file, found directory {}",
                patient_data_file.display()
            )));
        }

        Ok(Self { patient_data_file })
    }

    pub fn patient_data_file(&self) -> &Path {
        &self.patient_data_file
    }
}

/// Resolve the patient data file from an optional override value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PATIENT_DATA_FILE`].
pub fn patient_data_file_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENT_DATA_FILE))
}
