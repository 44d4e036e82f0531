// models/src/medical/appointment.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::lifecycle::Lifecycle;
use crate::medical::{DoctorDetail, PatientDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    // Position along the consultation path; cancelled sits off the path.
    fn stage(self) -> Option<u8> {
        match self {
            AppointmentStatus::Pending => Some(0),
            AppointmentStatus::Confirmed => Some(1),
            AppointmentStatus::InProgress => Some(2),
            AppointmentStatus::Completed => Some(3),
            AppointmentStatus::Cancelled => None,
        }
    }
}

impl Lifecycle for AppointmentStatus {
    const ENTITY: &'static str = "appointment";

    /// pending -> confirmed -> in_progress -> completed, moving forward only.
    /// Skipping ahead is allowed (a doctor may complete a walk-in straight
    /// from pending). Any open appointment may be cancelled.
    fn allows(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, _) => false,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "in_progress" => Ok(AppointmentStatus::InProgress),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(ValidationError::invalid(
                "status",
                format!("'{}' is not an appointment status", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub symptoms: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        patient_id: Uuid,
        doctor_id: Uuid,
        appointment_date: NaiveDate,
        appointment_time: String,
        symptoms: String,
    ) -> Self {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            appointment_date,
            appointment_time,
            symptoms,
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// `POST /appointments` body. Ids are the users' external identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub symptoms: Option<String>,
}

/// `PUT /appointments` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    pub id: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// `GET /appointments` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
}

/// Store-level filter, already resolved to internal ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.is_none_or(|id| id == appointment.patient_id)
            && self.doctor_id.is_none_or(|id| id == appointment.doctor_id)
    }
}

/// An appointment with its patient and doctor joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub symptoms: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub patient: Option<PatientDetail>,
    pub doctor: Option<DoctorDetail>,
}
