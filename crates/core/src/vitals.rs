//! Vital-sign records and the in-session draft.
//!
//! Three shapes of the same four measurements exist:
//!
//! - [`CanonicalVitals`]: what the patient store holds. Every field may be absent.
//! - [`DraftVitals`]: the working copy owned by one edit session. Always complete.
//! - [`VitalsSnapshot`]: a draft stamped with its commit time. Immutable once built.
//!
//! A draft is never edited in place. Each edit produces a new draft that differs from
//! its predecessor in exactly one field, which keeps the edit history easy to audit.

use crate::constants::{BLOOD_PRESSURE_PLACEHOLDER, TEMPERATURE_STEP};
use crate::{VitalsError, VitalsResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vitals_types::PatientId;

/// A patient as held by the canonical store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    #[serde(default)]
    pub vitals: CanonicalVitals,
}

/// The store's current vitals for a patient. Absent fields were never recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_sat: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_timestamp::option"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&VitalsSnapshot> for CanonicalVitals {
    fn from(snapshot: &VitalsSnapshot) -> Self {
        Self {
            heart_rate: Some(snapshot.heart_rate),
            blood_pressure: Some(snapshot.blood_pressure.clone()),
            temperature: Some(snapshot.temperature),
            oxygen_sat: Some(snapshot.oxygen_sat),
            timestamp: Some(snapshot.timestamp),
        }
    }
}

/// A committed set of vitals.
///
/// Serialises with camelCase keys and an ISO-8601 UTC timestamp at millisecond
/// precision, e.g. `2026-10-19T08:30:00.000Z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSnapshot {
    pub heart_rate: f64,
    pub blood_pressure: String,
    pub temperature: f64,
    pub oxygen_sat: f64,
    #[serde(with = "iso_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl VitalsSnapshot {
    /// The timestamp in the wire form used by the store.
    pub fn timestamp_iso(&self) -> String {
        iso_timestamp::format(&self.timestamp)
    }
}

/// One of the four editable vitals fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VitalsField {
    HeartRate,
    BloodPressure,
    Temperature,
    OxygenSat,
}

/// How a field is presented in the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    Number { step: Option<f64> },
    Text { placeholder: Option<&'static str> },
}

impl VitalsField {
    pub const ALL: [VitalsField; 4] = [
        VitalsField::HeartRate,
        VitalsField::BloodPressure,
        VitalsField::Temperature,
        VitalsField::OxygenSat,
    ];

    /// Stable form identifier, matching the snapshot's JSON key.
    pub fn id(self) -> &'static str {
        match self {
            VitalsField::HeartRate => "heartRate",
            VitalsField::BloodPressure => "bloodPressure",
            VitalsField::Temperature => "temperature",
            VitalsField::OxygenSat => "oxygenSat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VitalsField::HeartRate => "Heart Rate (bpm)",
            VitalsField::BloodPressure => "Blood Pressure",
            VitalsField::Temperature => "Temperature (°C)",
            VitalsField::OxygenSat => "Oxygen Saturation (%)",
        }
    }

    pub fn input_kind(self) -> InputKind {
        match self {
            VitalsField::HeartRate | VitalsField::OxygenSat => InputKind::Number { step: None },
            VitalsField::Temperature => InputKind::Number {
                step: Some(TEMPERATURE_STEP),
            },
            VitalsField::BloodPressure => InputKind::Text {
                placeholder: Some(BLOOD_PRESSURE_PLACEHOLDER),
            },
        }
    }
}

impl fmt::Display for VitalsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for VitalsField {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VitalsField::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| VitalsError::InvalidInput(format!("unknown vitals field: {s}")))
    }
}

/// A typed value for exactly one field.
///
/// Pairing the field with its value in one enum means an edit can never put a
/// string into a numeric field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    HeartRate(f64),
    BloodPressure(String),
    Temperature(f64),
    OxygenSat(f64),
}

impl FieldValue {
    pub fn field(&self) -> VitalsField {
        match self {
            FieldValue::HeartRate(_) => VitalsField::HeartRate,
            FieldValue::BloodPressure(_) => VitalsField::BloodPressure,
            FieldValue::Temperature(_) => VitalsField::Temperature,
            FieldValue::OxygenSat(_) => VitalsField::OxygenSat,
        }
    }

    /// Parses raw form input for `field`.
    ///
    /// Numeric input is trimmed; blank input reads as `0`, the way an emptied number
    /// box does. Blood pressure is free text and is taken verbatim. No value is range
    /// checked.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Validation`] if numeric input is not a finite number.
    pub fn parse(field: VitalsField, raw: &str) -> VitalsResult<Self> {
        let number = || -> VitalsResult<f64> {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| VitalsError::Validation {
                    field,
                    input: raw.to_string(),
                })
        };

        Ok(match field {
            VitalsField::HeartRate => FieldValue::HeartRate(number()?),
            VitalsField::BloodPressure => FieldValue::BloodPressure(raw.to_string()),
            VitalsField::Temperature => FieldValue::Temperature(number()?),
            VitalsField::OxygenSat => FieldValue::OxygenSat(number()?),
        })
    }
}

/// The working copy of a patient's vitals during one edit session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftVitals {
    heart_rate: f64,
    blood_pressure: String,
    temperature: f64,
    oxygen_sat: f64,
}

impl DraftVitals {
    /// Copies the canonical vitals into a fresh draft.
    ///
    /// Absent numbers become `0` and an absent blood pressure becomes `""`. A stored
    /// number that is not finite is treated as absent.
    pub fn initialise(canonical: &CanonicalVitals) -> Self {
        let number = |value: Option<f64>| value.filter(|n| n.is_finite()).unwrap_or(0.0);

        Self {
            heart_rate: number(canonical.heart_rate),
            blood_pressure: canonical.blood_pressure.clone().unwrap_or_default(),
            temperature: number(canonical.temperature),
            oxygen_sat: number(canonical.oxygen_sat),
        }
    }

    /// Returns a new draft with the one field named by `value` replaced.
    pub fn update_field(&self, value: FieldValue) -> Self {
        let mut next = self.clone();
        match value {
            FieldValue::HeartRate(v) => next.heart_rate = v,
            FieldValue::BloodPressure(v) => next.blood_pressure = v,
            FieldValue::Temperature(v) => next.temperature = v,
            FieldValue::OxygenSat(v) => next.oxygen_sat = v,
        }
        next
    }

    pub fn value(&self, field: VitalsField) -> FieldValue {
        match field {
            VitalsField::HeartRate => FieldValue::HeartRate(self.heart_rate),
            VitalsField::BloodPressure => FieldValue::BloodPressure(self.blood_pressure.clone()),
            VitalsField::Temperature => FieldValue::Temperature(self.temperature),
            VitalsField::OxygenSat => FieldValue::OxygenSat(self.oxygen_sat),
        }
    }

    pub fn heart_rate(&self) -> f64 {
        self.heart_rate
    }

    pub fn blood_pressure(&self) -> &str {
        &self.blood_pressure
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn oxygen_sat(&self) -> f64 {
        self.oxygen_sat
    }

    /// Copies the draft into a snapshot stamped with `timestamp`.
    ///
    /// The draft itself is left untouched so it can be resubmitted if the commit fails.
    pub fn to_snapshot(&self, timestamp: DateTime<Utc>) -> VitalsSnapshot {
        VitalsSnapshot {
            heart_rate: self.heart_rate,
            blood_pressure: self.blood_pressure.clone(),
            temperature: self.temperature,
            oxygen_sat: self.oxygen_sat,
            timestamp,
        }
    }
}

mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn parse<E: serde::de::Error>(raw: &str) -> Result<DateTime<Utc>, E> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(E::custom)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_some(&format(ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| parse(&raw))
                .transpose()
        }
    }
}
