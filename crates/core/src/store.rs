//! Reference [`PatientStore`] adapters.
//!
//! The host dashboard owns the real store. These adapters exist so the workflow can
//! run standalone (the `vitals` binary) and so tests have a real store to commit into.
//!
//! `JsonFilePatientStore` keeps every patient in one JSON array:
//!
//! ```text
//! [
//!   { "id": "p-1", "name": "Ada Lovelace",
//!     "vitals": { "heartRate": 72, "bloodPressure": "120/80", ... } }
//! ]
//! ```

use crate::config::CoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::ports::PatientStore;
use crate::vitals::{CanonicalVitals, Patient, VitalsSnapshot};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use vitals_types::PatientId;

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".into())
}

/// Patients held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPatientStore {
    patients: RwLock<BTreeMap<PatientId, Patient>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        let patients = patients.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            patients: RwLock::new(patients),
        }
    }

    /// Insert or replace a patient record.
    pub fn insert(&self, patient: Patient) -> StoreResult<()> {
        let mut patients = self.patients.write().map_err(|_| poisoned())?;
        patients.insert(patient.id.clone(), patient);
        Ok(())
    }

    /// All patients, ordered by id.
    pub fn patients(&self) -> StoreResult<Vec<Patient>> {
        let patients = self.patients.read().map_err(|_| poisoned())?;
        Ok(patients.values().cloned().collect())
    }
}

impl PatientStore for InMemoryPatientStore {
    fn patient(&self, patient_id: &PatientId) -> StoreResult<Option<Patient>> {
        let patients = self.patients.read().map_err(|_| poisoned())?;
        Ok(patients.get(patient_id).cloned())
    }

    fn update_vitals(&self, patient_id: &PatientId, snapshot: VitalsSnapshot) -> StoreResult<()> {
        let mut patients = self.patients.write().map_err(|_| poisoned())?;
        let patient = patients
            .get_mut(patient_id)
            .ok_or_else(|| StoreError::UnknownPatient(patient_id.to_string()))?;
        patient.vitals = CanonicalVitals::from(&snapshot);
        Ok(())
    }
}

/// Patients persisted as a JSON array in a single file.
///
/// Every commit re-reads the file, replaces one patient's vitals and writes the whole
/// array back through a temporary file and a rename, so readers never see a partial
/// write.
#[derive(Debug)]
pub struct JsonFilePatientStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePatientStore {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self::at(cfg.patient_data_file())
    }

    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every patient. A missing file is an empty store.
    pub fn load(&self) -> StoreResult<Vec<Patient>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::FileRead(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)
    }

    /// Insert or replace a patient record.
    pub fn insert(&self, patient: Patient) -> StoreResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| poisoned())?;
        let mut patients = self.load()?;
        match patients.iter_mut().find(|p| p.id == patient.id) {
            Some(existing) => *existing = patient,
            None => patients.push(patient),
        }
        self.save(&patients)
    }

    fn save(&self, patients: &[Patient]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::FileWrite)?;
        }

        let json = serde_json::to_string_pretty(patients).map_err(StoreError::Serialization)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StoreError::FileWrite)?;
        fs::rename(&tmp, &self.path).map_err(StoreError::FileWrite)
    }
}

impl PatientStore for JsonFilePatientStore {
    fn patient(&self, patient_id: &PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.load()?.into_iter().find(|p| &p.id == patient_id))
    }

    fn update_vitals(&self, patient_id: &PatientId, snapshot: VitalsSnapshot) -> StoreResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| poisoned())?;
        let mut patients = self.load()?;
        let patient = patients
            .iter_mut()
            .find(|p| &p.id == patient_id)
            .ok_or_else(|| StoreError::UnknownPatient(patient_id.to_string()))?;
        patient.vitals = CanonicalVitals::from(&snapshot);
        self.save(&patients)
    }
}
