//! Recording fakes for the ports. Every fake appends to one shared log so tests can
//! assert the order of calls across collaborators.

use crate::dialog::DialogHandle;
use crate::error::{NotificationError, StoreError, StoreResult};
use crate::ports::{Clock, DialogVisibilityController, NotificationSink, PatientStore};
use crate::store::InMemoryPatientStore;
use crate::vitals::{CanonicalVitals, FieldValue, Patient, VitalsField, VitalsSnapshot};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vitals_types::PatientId;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Commit(PatientId, VitalsSnapshot),
    Success(String, String),
    Failure(String, String),
    Close,
}

pub(crate) type CallLog = Arc<Mutex<Vec<Call>>>;

pub(crate) fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}

pub(crate) fn commits(log: &CallLog) -> usize {
    calls(log)
        .iter()
        .filter(|c| matches!(c, Call::Commit(..)))
        .count()
}

pub(crate) struct RecordingStore {
    pub inner: InMemoryPatientStore,
    log: CallLog,
    failures_left: AtomicUsize,
}

impl RecordingStore {
    pub fn new(log: CallLog, patients: impl IntoIterator<Item = Patient>) -> Self {
        Self {
            inner: InMemoryPatientStore::with_patients(patients),
            log,
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` commits fail with [`StoreError::Unavailable`].
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }
}

impl PatientStore for RecordingStore {
    fn patient(&self, patient_id: &PatientId) -> StoreResult<Option<Patient>> {
        self.inner.patient(patient_id)
    }

    fn update_vitals(&self, patient_id: &PatientId, snapshot: VitalsSnapshot) -> StoreResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(Call::Commit(patient_id.clone(), snapshot.clone()));
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.inner.update_vitals(patient_id, snapshot)
    }
}

pub(crate) struct RecordingNotifier {
    log: CallLog,
    broken: AtomicBool,
}

impl RecordingNotifier {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            broken: AtomicBool::new(false),
        }
    }

    /// Record calls but report every delivery as failed.
    pub fn break_delivery(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn deliver(&self, call: Call) -> Result<(), NotificationError> {
        self.log.lock().unwrap().push(call);
        if self.broken.load(Ordering::SeqCst) {
            return Err(NotificationError::Unavailable("toast host gone".into()));
        }
        Ok(())
    }
}

impl NotificationSink for RecordingNotifier {
    fn success(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        self.deliver(Call::Success(title.into(), message.into()))
    }

    fn failure(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        self.deliver(Call::Failure(title.into(), message.into()))
    }
}

pub(crate) struct RecordingDialog {
    inner: DialogHandle,
    log: CallLog,
}

impl RecordingDialog {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: DialogHandle::open(),
            log,
        }
    }
}

impl DialogVisibilityController for RecordingDialog {
    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn on_close(&self) {
        self.log.lock().unwrap().push(Call::Close);
        self.inner.on_close();
    }
}

/// A clock that advances one second on every read.
pub(crate) struct SteppingClock {
    start: DateTime<Utc>,
    reads: AtomicUsize,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
            reads: AtomicUsize::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(n as i64)
    }
}

/// A clock stuck at one instant.
pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn finite_number() -> impl Strategy<Value = f64> {
    -1.0e6f64..1.0e6
}

pub(crate) fn any_field() -> impl Strategy<Value = VitalsField> {
    prop::sample::select(VitalsField::ALL.to_vec())
}

pub(crate) fn any_field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        finite_number().prop_map(FieldValue::HeartRate),
        ".{0,12}".prop_map(FieldValue::BloodPressure),
        finite_number().prop_map(FieldValue::Temperature),
        finite_number().prop_map(FieldValue::OxygenSat),
    ]
}

pub(crate) fn patient_id(id: &str) -> PatientId {
    PatientId::parse(id).unwrap()
}

pub(crate) fn ward_patient() -> Patient {
    Patient {
        id: patient_id("p-1"),
        name: "Ada Lovelace".into(),
        vitals: CanonicalVitals {
            heart_rate: Some(72.0),
            blood_pressure: Some("120/80".into()),
            temperature: Some(36.6),
            oxygen_sat: Some(98.0),
            timestamp: None,
        },
    }
}

pub(crate) fn new_patient() -> Patient {
    Patient {
        id: patient_id("p-2"),
        name: "Grace Hopper".into(),
        vitals: CanonicalVitals::default(),
    }
}

pub(crate) struct Harness {
    pub log: CallLog,
    pub store: Arc<RecordingStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub dialog: Arc<RecordingDialog>,
    pub clock: Arc<SteppingClock>,
}

impl Harness {
    pub fn new() -> Self {
        let log: CallLog = Arc::default();
        Self {
            store: Arc::new(RecordingStore::new(
                log.clone(),
                [ward_patient(), new_patient()],
            )),
            notifier: Arc::new(RecordingNotifier::new(log.clone())),
            dialog: Arc::new(RecordingDialog::new(log.clone())),
            clock: Arc::new(SteppingClock::new()),
            log,
        }
    }

    pub fn pipeline(&self) -> crate::pipeline::SubmissionPipeline {
        crate::pipeline::SubmissionPipeline::new(self.store.clone(), self.notifier.clone())
            .with_clock(self.clock.clone())
    }
}
