//! Prescription transcription record and its text-report interpreter

use serde::Serialize;

use crate::line_record::{self, LineRecord};

/// Placeholder the model emits (and we default to) for absent fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Structured transcription of one prescription image.
///
/// `dosages`, `frequencies` and `durations` are aligned with `medications` by
/// index but may be shorter; use [`PrescriptionRecord::medication_lines`] to
/// read them with missing entries filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRecord {
    patient_name: String,
    medications: Vec<String>,
    dosages: Vec<String>,
    frequencies: Vec<String>,
    durations: Vec<String>,
    doctor_name: String,
    date: String,
    warnings: String,
}

/// One medication with its aligned dosage, frequency and duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedicationLine<'a> {
    pub name: &'a str,
    pub dosage: &'a str,
    pub frequency: &'a str,
    pub duration: &'a str,
}

impl PrescriptionRecord {
    pub fn builder() -> PrescriptionBuilder {
        PrescriptionBuilder::default()
    }

    /// Interpret a numbered text report produced by the model.
    ///
    /// Returns `None` when there is nothing to interpret (empty or blank
    /// text). Otherwise a record is always returned, possibly one that fails
    /// [`PrescriptionRecord::is_valid`].
    pub fn from_report(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }

        let mut builder = Self::builder();
        for record in line_record::parse(text) {
            if let LineRecord::Field { label, value, .. } = record {
                builder.apply(&label, &value);
            }
        }

        Some(builder.build())
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    pub fn dosages(&self) -> &[String] {
        &self.dosages
    }

    pub fn frequencies(&self) -> &[String] {
        &self.frequencies
    }

    pub fn durations(&self) -> &[String] {
        &self.durations
    }

    pub fn doctor_name(&self) -> &str {
        &self.doctor_name
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn warnings(&self) -> &str {
        &self.warnings
    }

    /// A record is usable if it names at least one medication or the patient
    pub fn is_valid(&self) -> bool {
        !self.medications.is_empty() || self.patient_name != NOT_AVAILABLE
    }

    pub fn medication_count(&self) -> usize {
        self.medications.len()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings != NOT_AVAILABLE && !self.warnings.trim().is_empty()
    }

    /// Medications paired with their aligned details; missing entries read `N/A`.
    pub fn medication_lines(&self) -> impl Iterator<Item = MedicationLine<'_>> {
        self.medications
            .iter()
            .enumerate()
            .map(|(i, name)| MedicationLine {
                name,
                dosage: aligned(&self.dosages, i),
                frequency: aligned(&self.frequencies, i),
                duration: aligned(&self.durations, i),
            })
    }
}

fn aligned(values: &[String], index: usize) -> &str {
    values.get(index).map_or(NOT_AVAILABLE, String::as_str)
}

/// Label setter used by the classification table
type FieldSetter = fn(&mut PrescriptionBuilder, &str);

/// Label stems in priority order. The first stem contained in a
/// (lowercased) label decides the field.
const LABEL_STEMS: [(&str, FieldSetter); 8] = [
    ("patient", set_patient_name),
    ("medication", set_medications),
    ("dosage", set_dosages),
    ("frequency", set_frequencies),
    ("duration", set_durations),
    ("doctor", set_doctor_name),
    ("date", set_date),
    ("warning", set_warnings),
];

fn set_patient_name(b: &mut PrescriptionBuilder, value: &str) {
    b.patient_name = Some(value.to_string());
}

fn set_medications(b: &mut PrescriptionBuilder, value: &str) {
    b.medications = Some(medication_list(value));
}

fn set_dosages(b: &mut PrescriptionBuilder, value: &str) {
    b.dosages = Some(split_list(value));
}

fn set_frequencies(b: &mut PrescriptionBuilder, value: &str) {
    b.frequencies = Some(split_list(value));
}

fn set_durations(b: &mut PrescriptionBuilder, value: &str) {
    b.durations = Some(split_list(value));
}

fn set_doctor_name(b: &mut PrescriptionBuilder, value: &str) {
    b.doctor_name = Some(value.to_string());
}

fn set_date(b: &mut PrescriptionBuilder, value: &str) {
    b.date = Some(value.to_string());
}

fn set_warnings(b: &mut PrescriptionBuilder, value: &str) {
    b.warnings = Some(value.to_string());
}

/// Comma-separated list, trimmed, placeholders kept for alignment
fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).collect()
}

fn medication_list(value: &str) -> Vec<String> {
    split_list(value)
        .into_iter()
        .filter(|m| !m.is_empty() && m != NOT_AVAILABLE)
        .collect()
}

/// Collects fields as they are found; defaults are applied once, in `build`.
#[derive(Debug, Default, Clone)]
pub struct PrescriptionBuilder {
    patient_name: Option<String>,
    medications: Option<Vec<String>>,
    dosages: Option<Vec<String>>,
    frequencies: Option<Vec<String>>,
    durations: Option<Vec<String>>,
    doctor_name: Option<String>,
    date: Option<String>,
    warnings: Option<String>,
}

impl PrescriptionBuilder {
    /// Route a labelled value to its field. Returns `false` for labels that
    /// match no known stem (those are ignored).
    pub fn apply(&mut self, label: &str, value: &str) -> bool {
        let label = label.to_lowercase();
        match LABEL_STEMS.iter().find(|(stem, _)| label.contains(stem)) {
            Some((_, set)) => {
                set(self, value);
                true
            }
            None => false,
        }
    }

    pub fn patient_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = Some(name.into());
        self
    }

    pub fn medications(mut self, medications: Vec<String>) -> Self {
        self.medications = Some(medications);
        self
    }

    pub fn dosages(mut self, dosages: Vec<String>) -> Self {
        self.dosages = Some(dosages);
        self
    }

    pub fn frequencies(mut self, frequencies: Vec<String>) -> Self {
        self.frequencies = Some(frequencies);
        self
    }

    pub fn durations(mut self, durations: Vec<String>) -> Self {
        self.durations = Some(durations);
        self
    }

    pub fn doctor_name(mut self, name: impl Into<String>) -> Self {
        self.doctor_name = Some(name.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn warnings(mut self, warnings: impl Into<String>) -> Self {
        self.warnings = Some(warnings.into());
        self
    }

    pub fn build(self) -> PrescriptionRecord {
        PrescriptionRecord {
            patient_name: text_or_default(self.patient_name),
            medications: self.medications.unwrap_or_default(),
            dosages: self.dosages.unwrap_or_default(),
            frequencies: self.frequencies.unwrap_or_default(),
            durations: self.durations.unwrap_or_default(),
            doctor_name: text_or_default(self.doctor_name),
            date: text_or_default(self.date),
            warnings: text_or_default(self.warnings),
        }
    }
}

fn text_or_default(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
