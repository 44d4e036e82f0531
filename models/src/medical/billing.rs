// models/src/medical/billing.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::inputs::NumericInput;
use crate::lifecycle::Lifecycle;
use crate::medical::{DoctorName, PatientName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl Lifecycle for PaymentStatus {
    const ENTITY: &'static str = "bill";

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (PaymentStatus::Pending, PaymentStatus::Paid))
    }

    fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(ValidationError::invalid(
                "payment_status",
                format!("'{}' is not a payment status", other),
            )),
        }
    }
}

/// The four charge components of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Charges {
    pub consultation_fee: f64,
    pub medicine_cost: f64,
    pub room_charges: f64,
    pub other_charges: f64,
}

impl Charges {
    pub fn total(&self) -> f64 {
        self.consultation_fee + self.medicine_cost + self.room_charges + self.other_charges
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub consultation_fee: f64,
    pub medicine_cost: f64,
    pub room_charges: f64,
    pub other_charges: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// The total is always derived from the components here, never taken
    /// from the caller.
    pub fn new(patient_id: Uuid, appointment_id: Option<Uuid>, charges: Charges) -> Self {
        let now = Utc::now();
        Bill {
            id: Uuid::new_v4(),
            patient_id,
            appointment_id,
            consultation_fee: charges.consultation_fee,
            medicine_cost: charges.medicine_cost,
            room_charges: charges.room_charges,
            other_charges: charges.other_charges,
            total_amount: charges.total(),
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// `POST /billing` body. Any `total_amount` a client sends is ignored
/// because the field does not exist here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBill {
    pub patient_user_id: Option<String>,
    pub appointment_id: Option<String>,
    pub consultation_fee: Option<NumericInput>,
    pub medicine_cost: Option<NumericInput>,
    pub room_charges: Option<NumericInput>,
    pub other_charges: Option<NumericInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillUpdate {
    pub id: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillQuery {
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillView {
    #[serde(flatten)]
    pub bill: Bill,
    pub patient: PatientName,
    pub appointment: Option<BilledAppointment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilledAppointment {
    pub appointment_date: NaiveDate,
    pub doctor: Option<DoctorName>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_the_sum_of_components() {
        let bill = Bill::new(
            Uuid::new_v4(),
            None,
            Charges { consultation_fee: 100.0, medicine_cost: 20.25, room_charges: 0.0, other_charges: 4.75 },
        );
        assert_eq!(bill.total_amount, 125.0);
        assert_eq!(bill.payment_status, PaymentStatus::Pending);
        assert!(bill.payment_date.is_none());
    }

    #[test]
    fn paid_never_regresses() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Paid));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
    }
}
