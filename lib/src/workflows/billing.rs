// lib/src/workflows/billing.rs

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use models::errors::{HospitalError, HospitalResult};
use models::inputs::{charge_or_zero, optional_text, optional_uuid, required_text, required_uuid};
use models::lifecycle::Lifecycle;
use models::medical::{
    BillQuery, BillUpdate, BillView, BilledAppointment, Bill, Charges, NewBill, PatientName,
    PaymentStatus, Role,
};

use super::{require_record, RecordJoiner};
use crate::resolver::IdentityResolver;
use crate::storage_engine::HospitalStore;

pub struct BillingWorkflow {
    store: Arc<dyn HospitalStore>,
    resolver: Arc<dyn IdentityResolver>,
}

impl BillingWorkflow {
    pub fn new(store: Arc<dyn HospitalStore>, resolver: Arc<dyn IdentityResolver>) -> Self {
        BillingWorkflow { store, resolver }
    }

    /// Issues a pending bill; the total is the sum of the four charges.
    pub async fn create(&self, request: &NewBill) -> HospitalResult<Bill> {
        let patient_user = required_text(&request.patient_user_id, "patient_user_id")?;
        let appointment_id = optional_uuid(&request.appointment_id, "appointment_id")?;
        let charges = Charges {
            consultation_fee: charge_or_zero(&request.consultation_fee, "consultation_fee")?,
            medicine_cost: charge_or_zero(&request.medicine_cost, "medicine_cost")?,
            room_charges: charge_or_zero(&request.room_charges, "room_charges")?,
            other_charges: charge_or_zero(&request.other_charges, "other_charges")?,
        };

        let patient_id = require_record(self.resolver.as_ref(), Role::Patient, &patient_user).await?;
        let bill = Bill::new(patient_id, appointment_id, charges);
        self.store.insert_bill(&bill).await?;
        info!(bill_id = %bill.id, %patient_id, total = bill.total_amount, "issued bill");
        Ok(bill)
    }

    /// Records a payment. Marking a paid bill paid again keeps the original
    /// payment date.
    pub async fn update(&self, request: &BillUpdate) -> HospitalResult<Bill> {
        let id = required_uuid(&request.id, "id")?;
        let status: PaymentStatus = required_text(&request.payment_status, "payment_status")?.parse()?;

        let mut bill = self
            .store
            .get_bill(id)
            .await?
            .ok_or_else(|| HospitalError::not_found(format!("bill {} not found", id)))?;

        let next = bill.payment_status.transition(status)?;
        let now = Utc::now();
        if next != bill.payment_status && next == PaymentStatus::Paid {
            bill.payment_date = Some(now);
        }
        bill.payment_status = next;
        bill.updated_at = now;
        self.store.update_bill(&bill).await?;
        info!(bill_id = %id, status = %bill.payment_status, "updated bill");
        Ok(bill)
    }

    /// Newest first, optionally for one patient's user id. Bills whose
    /// patient or user no longer resolve are dropped.
    pub async fn list(&self, query: &BillQuery) -> HospitalResult<Vec<BillView>> {
        let user_filter = optional_text(&query.patient_id);
        let mut bills = self.store.list_bills().await?;
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut joiner = RecordJoiner::new(self.store.as_ref());
        let mut views = Vec::new();
        for bill in bills {
            let Some(patient) = joiner.patient(bill.patient_id).await? else {
                continue;
            };
            if user_filter.as_deref().is_some_and(|user_id| user_id != patient.user_id) {
                continue;
            }
            let Some(user) = joiner.user_name(&patient.user_id).await? else {
                continue;
            };
            let appointment = match bill.appointment_id {
                Some(appointment_id) => match joiner.appointment(appointment_id).await? {
                    Some(appointment) => Some(BilledAppointment {
                        appointment_date: appointment.appointment_date,
                        doctor: joiner.doctor_name(appointment.doctor_id).await?,
                    }),
                    None => None,
                },
                None => None,
            };
            views.push(BillView { bill, patient: PatientName { user }, appointment });
        }
        debug!(count = views.len(), "listed bills");
        Ok(views)
    }
}
