//! # Vitals Core
//!
//! Core logic for editing and committing a patient's vital signs from a dashboard
//! dialog.
//!
//! This crate contains the editing workflow only:
//! - A draft copy of the four vitals fields, independent of the canonical record
//! - Parsing and accepting per-field edits
//! - Committing an immutable, timestamped snapshot to the patient store
//! - Notifying the user and closing the dialog, in that order
//!
//! **No UI concerns**: rendering the dialog or the toast, and persisting the store, belong
//! to the host application. The core reaches them through the traits in [`ports`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitals_core::{
//!     CanonicalVitals, DialogHandle, InMemoryPatientStore, Patient, SubmissionPipeline,
//!     TracingNotificationSink, VitalsEditSession, VitalsField,
//! };
//! use vitals_types::PatientId;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryPatientStore::with_patients([Patient {
//!     id: PatientId::parse("p-1")?,
//!     name: "Ada Lovelace".into(),
//!     vitals: CanonicalVitals::default(),
//! }]));
//! let pipeline = Arc::new(SubmissionPipeline::new(store, Arc::new(TracingNotificationSink)));
//!
//! let mut session = VitalsEditSession::open_by_id(
//!     &PatientId::parse("p-1")?,
//!     pipeline,
//!     Arc::new(DialogHandle::open()),
//! )?;
//! session.input(VitalsField::HeartRate, "80")?;
//! session.submit()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dialog;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod ports;
pub mod session;
pub mod store;
pub mod vitals;

#[cfg(test)]
mod test_support;

pub use config::CoreConfig;
pub use dialog::DialogHandle;
pub use error::{NotificationError, StoreError, StoreResult, VitalsError, VitalsResult};
pub use notify::TracingNotificationSink;
pub use pipeline::SubmissionPipeline;
pub use ports::{Clock, DialogVisibilityController, NotificationSink, PatientStore, SystemClock};
pub use session::{SessionState, SubmitOutcome, VitalsEditSession};
pub use store::{InMemoryPatientStore, JsonFilePatientStore};
pub use vitals::{
    CanonicalVitals, DraftVitals, FieldValue, InputKind, Patient, VitalsField, VitalsSnapshot,
};
pub use vitals_types::{NonEmptyText, PatientId};
