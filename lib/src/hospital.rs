// lib/src/hospital.rs

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::{HospitalConfig, StorageEngineType};
use crate::resolver::{CachedIdentityResolver, IdentityResolver};
use crate::storage_engine::{create_storage, HospitalStore, InMemoryStorage};
use crate::workflows::{
    AppointmentWorkflow, BillingWorkflow, InventoryWorkflow, PrescriptionWorkflow,
    RegistrationWorkflow, RoomWorkflow,
};

/// Entry point for the hospital backend: one store, one resolver and the
/// workflows built over them.
pub struct Hospital {
    store: Arc<dyn HospitalStore>,
    registration: RegistrationWorkflow,
    appointments: AppointmentWorkflow,
    prescriptions: PrescriptionWorkflow,
    inventory: InventoryWorkflow,
    rooms: RoomWorkflow,
    billing: BillingWorkflow,
}

impl Hospital {
    pub fn new(store: Arc<dyn HospitalStore>, config: &HospitalConfig) -> Self {
        let resolver: Arc<dyn IdentityResolver> =
            Arc::new(CachedIdentityResolver::new(store.clone(), &config.resolver));
        Hospital {
            registration: RegistrationWorkflow::new(store.clone(), resolver.clone()),
            appointments: AppointmentWorkflow::new(store.clone(), resolver.clone()),
            prescriptions: PrescriptionWorkflow::new(
                store.clone(),
                resolver.clone(),
                config.workflow.decrement_stock_on_prescribe,
            ),
            inventory: InventoryWorkflow::new(store.clone()),
            rooms: RoomWorkflow::new(store.clone(), resolver.clone()),
            billing: BillingWorkflow::new(store.clone(), resolver),
            store,
        }
    }

    /// Opens the configured storage engine and wires the workflows.
    pub fn open(config: &HospitalConfig) -> Result<Self> {
        let store = create_storage(&config.storage)?;
        info!(
            engine = %config.storage.engine,
            decrement_stock = config.workflow.decrement_stock_on_prescribe,
            "hospital backend ready"
        );
        Ok(Hospital::new(store, config))
    }

    /// A throwaway instance backed by the in-memory engine.
    pub fn in_memory() -> Self {
        Hospital::new(Arc::new(InMemoryStorage::new()), &HospitalConfig::default())
    }

    pub fn engine_type(&self) -> StorageEngineType {
        self.store.engine_type()
    }

    pub fn registration(&self) -> &RegistrationWorkflow {
        &self.registration
    }

    pub fn appointments(&self) -> &AppointmentWorkflow {
        &self.appointments
    }

    pub fn prescriptions(&self) -> &PrescriptionWorkflow {
        &self.prescriptions
    }

    pub fn inventory(&self) -> &InventoryWorkflow {
        &self.inventory
    }

    pub fn rooms(&self) -> &RoomWorkflow {
        &self.rooms
    }

    pub fn billing(&self) -> &BillingWorkflow {
        &self.billing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use models::errors::HospitalError;
    use models::inputs::NumericInput;
    use models::medical::{
        AppointmentQuery, AppointmentStatus, AppointmentUpdate, BillUpdate, NewAppointment,
        NewBill, NewUser, PaymentStatus,
    };

    async fn register(hospital: &Hospital, id: &str, role: &str) {
        hospital
            .registration()
            .register(&NewUser {
                id: Some(id.into()),
                email: Some(format!("{}@example.com", id)),
                full_name: Some(format!("{} user", role)),
                role: Some(role.into()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    async fn consultation_to_payment(hospital: &Hospital) {
        register(hospital, "pat-1", "patient").await;
        register(hospital, "doc-1", "doctor").await;

        let booked = hospital
            .appointments()
            .create(&NewAppointment {
                patient_id: Some("pat-1".into()),
                doctor_id: Some("doc-1".into()),
                appointment_date: Some("2025-01-10".into()),
                appointment_time: Some("10:00".into()),
                symptoms: Some("fever".into()),
            })
            .await
            .unwrap();
        let listed = hospital
            .appointments()
            .list(&AppointmentQuery { patient_id: Some("pat-1".into()), doctor_id: None })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, AppointmentStatus::Pending);
        assert_eq!(listed[0].symptoms, "fever");

        let completed = hospital
            .appointments()
            .update(&AppointmentUpdate {
                id: Some(booked.id.to_string()),
                status: Some("completed".into()),
                notes: Some("Prescribed rest".into()),
            })
            .await
            .unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);
        assert_eq!(completed.notes.as_deref(), Some("Prescribed rest"));

        let bill = hospital
            .billing()
            .create(&NewBill {
                patient_user_id: Some("pat-1".into()),
                appointment_id: Some(booked.id.to_string()),
                consultation_fee: Some(NumericInput::from(500.0)),
                medicine_cost: Some(NumericInput::from(0.0)),
                room_charges: Some(NumericInput::from(0.0)),
                other_charges: Some(NumericInput::from(0.0)),
            })
            .await
            .unwrap();
        assert_eq!(bill.total_amount, 500.0);
        assert_eq!(bill.payment_status, PaymentStatus::Pending);

        let paid = hospital
            .billing()
            .update(&BillUpdate { id: Some(bill.id.to_string()), payment_status: Some("paid".into()) })
            .await
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert!(paid.payment_date.is_some());

        let reopen = hospital
            .appointments()
            .update(&AppointmentUpdate {
                id: Some(booked.id.to_string()),
                status: Some("pending".into()),
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(reopen, HospitalError::Validation(_)));
    }

    #[tokio::test]
    async fn consultation_to_payment_in_memory() {
        let hospital = Hospital::in_memory();
        assert_eq!(hospital.engine_type(), StorageEngineType::InMemory);
        consultation_to_payment(&hospital).await;
    }

    #[tokio::test]
    async fn consultation_to_payment_on_sled() {
        let dir = tempfile::tempdir().unwrap();
        let config = HospitalConfig {
            storage: StorageConfig {
                engine: StorageEngineType::Sled,
                data_directory: dir.path().to_path_buf(),
            },
            ..Default::default()
        };
        let hospital = Hospital::open(&config).unwrap();
        assert_eq!(hospital.engine_type(), StorageEngineType::Sled);
        consultation_to_payment(&hospital).await;
    }
}
