//! Collaborators the vitals workflow depends on but does not implement.
//!
//! The host application supplies the patient store, the notification widget and the
//! dialog. The core only talks to them through these traits, so the submit path can be
//! exercised without any UI.

use crate::error::{NotificationError, StoreResult};
use crate::vitals::{Patient, VitalsSnapshot};
use chrono::{DateTime, Utc};
use vitals_types::PatientId;

/// The canonical source of patient vitals.
pub trait PatientStore: Send + Sync {
    /// Fetch the current record for `patient_id`, or `None` if the store has no such patient.
    fn patient(&self, patient_id: &PatientId) -> StoreResult<Option<Patient>>;

    /// Replace the patient's canonical vitals with `snapshot` in one step.
    fn update_vitals(&self, patient_id: &PatientId, snapshot: VitalsSnapshot) -> StoreResult<()>;
}

/// One-shot user notifications.
pub trait NotificationSink: Send + Sync {
    fn success(&self, title: &str, message: &str) -> Result<(), NotificationError>;

    fn failure(&self, title: &str, message: &str) -> Result<(), NotificationError>;
}

/// Owner of the dialog's open flag.
pub trait DialogVisibilityController: Send + Sync {
    fn is_open(&self) -> bool;

    fn on_close(&self);
}

/// Source of commit timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
