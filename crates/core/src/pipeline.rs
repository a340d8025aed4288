//! Turns a draft into a committed snapshot.
//!
//! A submit always runs the same steps in the same order:
//!
//! 1. stamp the draft with the current time,
//! 2. commit the snapshot to the patient store,
//! 3. send the success notification,
//! 4. close the dialog.
//!
//! If step 2 fails the remaining steps are replaced by a failure notification and the
//! dialog stays open. A failed notification is logged and otherwise ignored.

use crate::constants::{FAILURE_MESSAGE, FAILURE_TITLE, SUCCESS_MESSAGE, SUCCESS_TITLE};
use crate::error::{VitalsError, VitalsResult};
use crate::ports::{Clock, DialogVisibilityController, NotificationSink, PatientStore, SystemClock};
use crate::vitals::{DraftVitals, VitalsSnapshot};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use vitals_types::PatientId;

/// Commit orchestration shared by every edit session in the host.
#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn PatientStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl SubmissionPipeline {
    /// Creates a pipeline that stamps snapshots with the system clock.
    pub fn new(store: Arc<dyn PatientStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            notifier,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &dyn PatientStore {
        self.store.as_ref()
    }

    /// Current time, truncated to the millisecond precision snapshots are stored at.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    /// Commits `draft` as the patient's canonical vitals.
    ///
    /// The draft is borrowed, not consumed: on failure the caller still holds it
    /// unchanged and can submit again.
    ///
    /// # Returns
    ///
    /// The snapshot that was committed.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::StoreUnavailable`] if the store rejects the commit. In
    /// that case a failure notification has been sent and `dialog` was not closed.
    pub fn submit(
        &self,
        draft: &DraftVitals,
        patient_id: &PatientId,
        dialog: &dyn DialogVisibilityController,
    ) -> VitalsResult<VitalsSnapshot> {
        let snapshot = draft.to_snapshot(self.now());

        if let Err(e) = self.store.update_vitals(patient_id, snapshot.clone()) {
            tracing::warn!(%patient_id, error = %e, "vitals commit failed");
            if let Err(notify_err) = self.notifier.failure(FAILURE_TITLE, FAILURE_MESSAGE) {
                tracing::warn!(error = %notify_err, "failed to deliver failure notification");
            }
            return Err(VitalsError::StoreUnavailable(e));
        }

        tracing::info!(
            %patient_id,
            timestamp = %snapshot.timestamp_iso(),
            "vitals committed"
        );

        if let Err(e) = self.notifier.success(SUCCESS_TITLE, SUCCESS_MESSAGE) {
            tracing::warn!(error = %e, "failed to deliver success notification");
        }

        dialog.on_close();
        Ok(snapshot)
    }

    /// Discards `draft` and closes the dialog. The store is never touched.
    pub fn cancel(&self, draft: DraftVitals, dialog: &dyn DialogVisibilityController) {
        drop(draft);
        tracing::debug!("vitals edit cancelled");
        dialog.on_close();
    }
}
