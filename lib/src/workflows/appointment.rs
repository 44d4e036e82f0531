// lib/src/workflows/appointment.rs

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use models::errors::{HospitalError, HospitalResult};
use models::inputs::{
    optional_text, required_date, required_text, required_time, required_uuid, time_of_day,
};
use models::lifecycle::Lifecycle;
use models::medical::{
    Appointment, AppointmentFilter, AppointmentQuery, AppointmentStatus, AppointmentUpdate,
    AppointmentView, NewAppointment, Role,
};

use super::{require_record, RecordJoiner};
use crate::resolver::IdentityResolver;
use crate::storage_engine::HospitalStore;

pub struct AppointmentWorkflow {
    store: Arc<dyn HospitalStore>,
    resolver: Arc<dyn IdentityResolver>,
}

impl AppointmentWorkflow {
    pub fn new(store: Arc<dyn HospitalStore>, resolver: Arc<dyn IdentityResolver>) -> Self {
        AppointmentWorkflow { store, resolver }
    }

    /// Books a pending appointment between two registered users.
    pub async fn create(&self, request: &NewAppointment) -> HospitalResult<Appointment> {
        let patient_user = required_text(&request.patient_id, "patient_id")?;
        let doctor_user = required_text(&request.doctor_id, "doctor_id")?;
        let date = required_date(&request.appointment_date, "appointment_date")?;
        let time = required_time(&request.appointment_time, "appointment_time")?;
        let symptoms = optional_text(&request.symptoms).unwrap_or_default();

        let patient_id = require_record(self.resolver.as_ref(), Role::Patient, &patient_user).await?;
        let doctor_id = require_record(self.resolver.as_ref(), Role::Doctor, &doctor_user).await?;

        let appointment = Appointment::new(patient_id, doctor_id, date, time, symptoms);
        self.store.insert_appointment(&appointment).await?;
        info!(appointment_id = %appointment.id, %patient_id, %doctor_id, "booked appointment");
        Ok(appointment)
    }

    /// Lists appointments, optionally narrowed to one patient and/or doctor.
    /// A filter naming an unknown user matches nothing.
    pub async fn list(&self, query: &AppointmentQuery) -> HospitalResult<Vec<AppointmentView>> {
        let mut filter = AppointmentFilter::default();
        if let Some(user_id) = optional_text(&query.patient_id) {
            match self.resolver.patient_id(&user_id).await? {
                Some(id) => filter.patient_id = Some(id),
                None => return Ok(Vec::new()),
            }
        }
        if let Some(user_id) = optional_text(&query.doctor_id) {
            match self.resolver.doctor_id(&user_id).await? {
                Some(id) => filter.doctor_id = Some(id),
                None => return Ok(Vec::new()),
            }
        }

        let mut appointments = self.store.list_appointments(filter).await?;
        appointments.sort_by_cached_key(|a| {
            (a.appointment_date, time_of_day(&a.appointment_time), a.appointment_time.clone())
        });

        let mut joiner = RecordJoiner::new(self.store.as_ref());
        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let patient = joiner.patient_detail(appointment.patient_id).await?;
            let doctor = joiner.doctor_detail(appointment.doctor_id).await?;
            views.push(AppointmentView {
                id: appointment.id,
                appointment_date: appointment.appointment_date,
                appointment_time: appointment.appointment_time,
                symptoms: appointment.symptoms,
                status: appointment.status,
                notes: appointment.notes,
                created_at: appointment.created_at,
                patient,
                doctor,
            });
        }
        debug!(count = views.len(), ?filter, "listed appointments");
        Ok(views)
    }

    /// Moves the appointment along its lifecycle. Notes are replaced only
    /// when the request carries them.
    pub async fn update(&self, request: &AppointmentUpdate) -> HospitalResult<Appointment> {
        let id = required_uuid(&request.id, "id")?;
        let status: AppointmentStatus = required_text(&request.status, "status")?.parse()?;

        let mut appointment = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| HospitalError::not_found(format!("appointment {} not found", id)))?;

        appointment.status = appointment.status.transition(status)?;
        if request.notes.is_some() {
            appointment.notes = optional_text(&request.notes);
        }
        appointment.updated_at = Utc::now();
        self.store.update_appointment(&appointment).await?;
        info!(appointment_id = %id, status = %appointment.status, "updated appointment");
        Ok(appointment)
    }
}
