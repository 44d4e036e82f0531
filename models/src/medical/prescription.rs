use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::{DoctorName, MedicineSummary};

/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub medicine_id: Uuid,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPrescription {
    pub appointment_id: Option<String>,
    pub medicine_id: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionQuery {
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionView {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub medicine: Option<MedicineSummary>,
    pub appointment: Option<PrescribedAt>,
}

impl PrescriptionView {
    /// A listing row is only shown when the appointment, its doctor and the
    /// doctor's user all joined.
    pub fn is_complete(&self) -> bool {
        self.appointment
            .as_ref()
            .and_then(|a| a.doctor.as_ref())
            .and_then(|d| d.user.as_ref())
            .is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedAt {
    pub appointment_date: NaiveDate,
    pub doctor: Option<DoctorName>,
}
