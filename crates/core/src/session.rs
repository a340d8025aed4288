//! One open vitals dialog.
//!
//! A session lives from the moment the dialog opens until it closes through submit or
//! cancel. It is the only owner of the draft: the store never sees the draft itself,
//! only the snapshot copied from it on submit.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► Editing ──submit ok──► Closed
//!            │  ▲
//!            │  └─submit failed (draft kept, dialog stays open)
//!            └──cancel / dismissed──► Closed
//! ```
//!
//! Once closed, further submits are reported as [`SubmitOutcome::Ignored`] and
//! cancels do nothing, so the store is committed to and the dialog closed at most
//! once per session.

use crate::constants::DIALOG_TITLE_PREFIX;
use crate::error::{VitalsError, VitalsResult};
use crate::pipeline::SubmissionPipeline;
use crate::ports::DialogVisibilityController;
use crate::vitals::{DraftVitals, FieldValue, Patient, VitalsField, VitalsSnapshot};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use vitals_types::PatientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Closed,
}

/// Result of a submit that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Committed(VitalsSnapshot),
    /// The session had already closed; nothing was committed.
    Ignored,
}

pub struct VitalsEditSession {
    pipeline: Arc<SubmissionPipeline>,
    dialog: Arc<dyn DialogVisibilityController>,
    patient_id: PatientId,
    patient_name: String,
    draft: Option<DraftVitals>,
    field_errors: BTreeMap<VitalsField, String>,
    opened_at: DateTime<Utc>,
}

impl VitalsEditSession {
    /// Opens a session for `patient`, copying its canonical vitals into a new draft.
    pub fn open(
        patient: &Patient,
        pipeline: Arc<SubmissionPipeline>,
        dialog: Arc<dyn DialogVisibilityController>,
    ) -> Self {
        let opened_at = pipeline.now();
        tracing::debug!(patient_id = %patient.id, "vitals session opened");

        Self {
            draft: Some(DraftVitals::initialise(&patient.vitals)),
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            field_errors: BTreeMap::new(),
            pipeline,
            dialog,
            opened_at,
        }
    }

    /// Looks the patient up in the pipeline's store and opens a session for it.
    ///
    /// # Errors
    ///
    /// - [`VitalsError::PatientNotFound`] if the store has no such patient.
    /// - [`VitalsError::StoreUnavailable`] if the store can't be read.
    pub fn open_by_id(
        patient_id: &PatientId,
        pipeline: Arc<SubmissionPipeline>,
        dialog: Arc<dyn DialogVisibilityController>,
    ) -> VitalsResult<Self> {
        let patient = pipeline
            .store()
            .patient(patient_id)
            .map_err(VitalsError::StoreUnavailable)?
            .ok_or_else(|| VitalsError::PatientNotFound(patient_id.to_string()))?;
        Ok(Self::open(&patient, pipeline, dialog))
    }

    /// Dialog heading, e.g. `Update Vitals - Ada Lovelace`.
    pub fn title(&self) -> String {
        format!("{DIALOG_TITLE_PREFIX}{}", self.patient_name)
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn state(&self) -> SessionState {
        match self.draft {
            Some(_) => SessionState::Editing,
            None => SessionState::Closed,
        }
    }

    /// Whether the host currently shows the dialog.
    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    /// The current draft, or `None` once the session has closed.
    pub fn draft(&self) -> Option<&DraftVitals> {
        self.draft.as_ref()
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.state() == SessionState::Editing
    }

    /// Inline message for the last rejected input of `field`, if any.
    pub fn field_error(&self, field: VitalsField) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// Applies a typed edit. Exactly one field of the draft changes.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::SessionClosed`] if the session has already closed.
    pub fn set_field(&mut self, value: FieldValue) -> VitalsResult<()> {
        let draft = self.draft.as_ref().ok_or(VitalsError::SessionClosed)?;
        let field = value.field();
        let next = draft.update_field(value);
        tracing::debug!(%field, "vitals field edited");

        self.draft = Some(next);
        self.field_errors.remove(&field);
        Ok(())
    }

    /// Applies raw form input to `field`.
    ///
    /// Rejected input leaves the draft unchanged and records an inline message for the
    /// field, readable through [`field_error`](Self::field_error).
    ///
    /// # Errors
    ///
    /// - [`VitalsError::Validation`] if the input is malformed for the field.
    /// - [`VitalsError::SessionClosed`] if the session has already closed.
    pub fn input(&mut self, field: VitalsField, raw: &str) -> VitalsResult<()> {
        if self.draft.is_none() {
            return Err(VitalsError::SessionClosed);
        }

        match FieldValue::parse(field, raw) {
            Ok(value) => self.set_field(value),
            Err(e) => {
                tracing::debug!(%field, "rejected vitals input");
                self.field_errors.insert(field, e.to_string());
                Err(e)
            }
        }
    }

    /// Commits the draft.
    ///
    /// On success the draft is discarded and the session closes. If the store fails
    /// the session stays open with the draft unchanged, ready for another submit.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::StoreUnavailable`] if the commit failed.
    pub fn submit(&mut self) -> VitalsResult<SubmitOutcome> {
        let Some(draft) = self.draft.as_ref() else {
            tracing::debug!(patient_id = %self.patient_id, "submit on closed session ignored");
            return Ok(SubmitOutcome::Ignored);
        };

        let snapshot = self
            .pipeline
            .submit(draft, &self.patient_id, self.dialog.as_ref())?;

        self.draft = None;
        self.field_errors.clear();
        Ok(SubmitOutcome::Committed(snapshot))
    }

    /// Discards the draft and closes the dialog without committing.
    pub fn cancel(&mut self) {
        if let Some(draft) = self.draft.take() {
            self.field_errors.clear();
            self.pipeline.cancel(draft, self.dialog.as_ref());
        }
    }

    /// Handles the host reporting a change of the dialog's open state.
    ///
    /// Dismissing the dialog (overlay click, escape) is a cancel.
    pub fn on_open_change(&mut self, open: bool) {
        if !open {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::TracingNotificationSink;
    use crate::ports::PatientStore;
    use crate::store::JsonFilePatientStore;
    use crate::test_support::{
        any_field, any_field_value, calls, commits, new_patient, patient_id, ward_patient, Call,
        FixedClock, Harness,
    };
    use crate::vitals::CanonicalVitals;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn open(h: &Harness, patient: &Patient) -> VitalsEditSession {
        VitalsEditSession::open(patient, Arc::new(h.pipeline()), h.dialog.clone())
    }

    #[test]
    fn edit_heart_rate_then_submit() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());

        session
            .input(VitalsField::HeartRate, "80")
            .expect("valid input");
        let SubmitOutcome::Committed(snapshot) = session.submit().expect("submit should succeed")
        else {
            panic!("expected a commit");
        };
        assert_eq!(snapshot.heart_rate, 80.0);
        assert_eq!(snapshot.blood_pressure, "120/80");
        assert_eq!(snapshot.temperature, 36.6);
        assert_eq!(snapshot.oxygen_sat, 98.0);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.draft().is_none());
        assert!(!session.is_open());
    }

    #[test]
    fn patient_without_vitals_opens_with_defaults() {
        let h = Harness::new();
        let session = open(&h, &new_patient());
        assert_eq!(session.draft(), Some(&DraftVitals::default()));
    }

    #[test]
    fn unedited_submit_commits_canonical_vitals_with_later_timestamp() {
        let h = Harness::new();
        let patient = ward_patient();
        let mut session = open(&h, &patient);

        let SubmitOutcome::Committed(snapshot) = session.submit().unwrap() else {
            panic!("expected a commit");
        };

        assert!(snapshot.timestamp >= session.opened_at());
        let expected = CanonicalVitals {
            timestamp: Some(snapshot.timestamp),
            ..patient.vitals
        };
        assert_eq!(CanonicalVitals::from(&snapshot), expected);
    }

    #[test]
    fn cancel_after_edits_never_commits() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());

        session
            .set_field(FieldValue::BloodPressure("130/85".into()))
            .unwrap();
        session.input(VitalsField::Temperature, "38.1").unwrap();
        session.cancel();

        assert_eq!(commits(&h.log), 0);
        assert_eq!(calls(&h.log), vec![Call::Close]);
        assert_eq!(session.state(), SessionState::Closed);
        let stored = h.store.patient(&patient_id("p-1")).unwrap().unwrap();
        assert_eq!(stored.vitals, ward_patient().vitals);
    }

    #[test]
    fn negative_heart_rate_is_committed() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());

        session.input(VitalsField::HeartRate, "-5").unwrap();
        let SubmitOutcome::Committed(snapshot) = session.submit().unwrap() else {
            panic!("expected a commit");
        };
        assert_eq!(snapshot.heart_rate, -5.0);
    }

    #[test]
    fn duplicate_submit_is_ignored() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());

        assert!(matches!(session.submit(), Ok(SubmitOutcome::Committed(_))));
        assert!(!session.can_submit());
        assert!(matches!(session.submit(), Ok(SubmitOutcome::Ignored)));
        session.cancel();

        let log = calls(&h.log);
        assert_eq!(commits(&h.log), 1);
        assert_eq!(log.iter().filter(|c| **c == Call::Close).count(), 1);
        assert_eq!(log.last(), Some(&Call::Close));
    }

    #[test]
    fn store_failure_keeps_draft_for_retry() {
        let h = Harness::new();
        h.store.fail_next(1);
        let mut session = open(&h, &ward_patient());
        session.input(VitalsField::OxygenSat, "95").unwrap();
        let before = session.draft().cloned();

        let err = session.submit().unwrap_err();
        assert!(matches!(err, VitalsError::StoreUnavailable(_)));
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.draft().cloned(), before);
        assert!(session.is_open());

        let SubmitOutcome::Committed(snapshot) = session.submit().unwrap() else {
            panic!("expected retry to commit");
        };
        assert_eq!(snapshot.oxygen_sat, 95.0);
        assert_eq!(commits(&h.log), 2);
        assert_eq!(calls(&h.log).last(), Some(&Call::Close));
    }

    #[test]
    fn malformed_input_is_rejected_inline() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());

        let err = session.input(VitalsField::HeartRate, "fast").unwrap_err();
        assert!(matches!(err, VitalsError::Validation { .. }));
        assert_eq!(session.draft().unwrap().heart_rate(), 72.0);
        assert!(session
            .field_error(VitalsField::HeartRate)
            .is_some_and(|msg| msg.contains("fast")));

        session.input(VitalsField::HeartRate, "75").unwrap();
        assert_eq!(session.field_error(VitalsField::HeartRate), None);
        assert_eq!(commits(&h.log), 0);
    }

    #[test]
    fn edits_after_close_are_rejected() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());
        session.cancel();

        assert!(matches!(
            session.input(VitalsField::HeartRate, "90"),
            Err(VitalsError::SessionClosed)
        ));
        assert!(matches!(
            session.set_field(FieldValue::OxygenSat(90.0)),
            Err(VitalsError::SessionClosed)
        ));
    }

    #[test]
    fn dismissing_dialog_cancels() {
        let h = Harness::new();
        let mut session = open(&h, &ward_patient());

        session.on_open_change(true);
        assert_eq!(session.state(), SessionState::Editing);

        session.on_open_change(false);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(calls(&h.log), vec![Call::Close]);
    }

    #[test]
    fn open_by_id_reads_canonical_record() {
        let h = Harness::new();
        let pipeline = Arc::new(h.pipeline());

        let session =
            VitalsEditSession::open_by_id(&patient_id("p-1"), pipeline.clone(), h.dialog.clone())
                .expect("patient exists");
        assert_eq!(session.title(), "Update Vitals - Ada Lovelace");
        assert_eq!(session.draft().unwrap().blood_pressure(), "120/80");

        let missing = VitalsEditSession::open_by_id(&patient_id("ghost"), pipeline, h.dialog.clone());
        assert!(matches!(missing, Err(VitalsError::PatientNotFound(ref id)) if id == "ghost"));
    }

    #[test]
    fn json_store_keeps_committed_snapshot_exactly() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(JsonFilePatientStore::at(temp_dir.path().join("patients.json")));
        store.insert(ward_patient()).expect("seed patient");

        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
            + Duration::microseconds(500);
        let pipeline = SubmissionPipeline::new(store.clone(), Arc::new(TracingNotificationSink))
            .with_clock(Arc::new(FixedClock(instant)));
        let h = Harness::new();
        let mut session = VitalsEditSession::open(&ward_patient(), Arc::new(pipeline), h.dialog.clone());

        let SubmitOutcome::Committed(snapshot) = session.submit().expect("submit should succeed")
        else {
            panic!("expected a commit");
        };

        let stored = store.patient(&patient_id("p-1")).unwrap().unwrap();
        assert_eq!(stored.vitals, CanonicalVitals::from(&snapshot));
        assert!(stored.vitals.timestamp.unwrap() >= session.opened_at());
        assert_eq!(snapshot.timestamp_iso(), "2026-10-19T08:00:00.000Z");
    }

    #[derive(Debug, Clone)]
    enum Edit {
        Input(VitalsField, String),
        Set(FieldValue),
    }

    fn any_edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            (any_field(), "[-0-9a-z./ ]{0,8}").prop_map(|(field, raw)| Edit::Input(field, raw)),
            any_field_value().prop_map(Edit::Set),
        ]
    }

    proptest! {
        #[test]
        fn any_edits_then_cancel_never_commit(edits in prop::collection::vec(any_edit(), 0..16)) {
            let h = Harness::new();
            let mut session = open(&h, &ward_patient());

            for edit in edits {
                // Rejected input is part of the sequence; only the outcome of cancel matters.
                let _ = match edit {
                    Edit::Input(field, raw) => session.input(field, &raw),
                    Edit::Set(value) => session.set_field(value),
                };
            }
            session.cancel();

            prop_assert_eq!(commits(&h.log), 0);
            prop_assert_eq!(calls(&h.log), vec![Call::Close]);
            let stored = h.store.patient(&patient_id("p-1")).unwrap().unwrap();
            prop_assert_eq!(stored.vitals, ward_patient().vitals);
        }
    }
}
