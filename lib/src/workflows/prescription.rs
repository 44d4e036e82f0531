// lib/src/workflows/prescription.rs

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use models::errors::HospitalResult;
use models::inputs::{optional_text, required_text, required_uuid};
use models::medical::{
    AppointmentFilter, MedicineSummary, NewPrescription, PrescribedAt, Prescription,
    PrescriptionQuery, PrescriptionView,
};

use super::RecordJoiner;
use crate::resolver::IdentityResolver;
use crate::storage_engine::HospitalStore;

pub struct PrescriptionWorkflow {
    store: Arc<dyn HospitalStore>,
    resolver: Arc<dyn IdentityResolver>,
    decrement_stock: bool,
}

impl PrescriptionWorkflow {
    pub fn new(
        store: Arc<dyn HospitalStore>,
        resolver: Arc<dyn IdentityResolver>,
        decrement_stock: bool,
    ) -> Self {
        PrescriptionWorkflow { store, resolver, decrement_stock }
    }

    /// The appointment and medicine are checked by the store's foreign keys.
    pub async fn create(&self, request: &NewPrescription) -> HospitalResult<Prescription> {
        let prescription = Prescription {
            id: Uuid::new_v4(),
            appointment_id: required_uuid(&request.appointment_id, "appointment_id")?,
            medicine_id: required_uuid(&request.medicine_id, "medicine_id")?,
            dosage: required_text(&request.dosage, "dosage")?,
            frequency: required_text(&request.frequency, "frequency")?,
            duration: required_text(&request.duration, "duration")?,
            instructions: optional_text(&request.instructions),
            created_at: Utc::now(),
        };
        self.store.insert_prescription(&prescription, self.decrement_stock).await?;
        info!(
            prescription_id = %prescription.id,
            appointment_id = %prescription.appointment_id,
            decrement_stock = self.decrement_stock,
            "recorded prescription"
        );
        Ok(prescription)
    }

    /// Newest first. Rows whose appointment, doctor or doctor's user no
    /// longer resolve are left out.
    pub async fn list(&self, query: &PrescriptionQuery) -> HospitalResult<Vec<PrescriptionView>> {
        let scope = match optional_text(&query.patient_id) {
            Some(user_id) => {
                let Some(patient_id) = self.resolver.patient_id(&user_id).await? else {
                    return Ok(Vec::new());
                };
                let filter = AppointmentFilter { patient_id: Some(patient_id), doctor_id: None };
                let ids: Vec<Uuid> = self
                    .store
                    .list_appointments(filter)
                    .await?
                    .into_iter()
                    .map(|a| a.id)
                    .collect();
                if ids.is_empty() {
                    debug!(%patient_id, "patient has no appointments");
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            None => None,
        };

        let mut prescriptions = self.store.list_prescriptions(scope).await?;
        prescriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut joiner = RecordJoiner::new(self.store.as_ref());
        let mut views = Vec::with_capacity(prescriptions.len());
        for prescription in prescriptions {
            let medicine = joiner
                .medicine(prescription.medicine_id)
                .await?
                .as_ref()
                .map(MedicineSummary::from);
            let appointment = match joiner.appointment(prescription.appointment_id).await? {
                Some(appointment) => Some(PrescribedAt {
                    appointment_date: appointment.appointment_date,
                    doctor: joiner.doctor_name(appointment.doctor_id).await?,
                }),
                None => None,
            };
            let view = PrescriptionView { prescription, medicine, appointment };
            if view.is_complete() {
                views.push(view);
            }
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::MockHospitalStore;
    use crate::workflows::testing::Fixture;
    use crate::workflows::{AppointmentWorkflow, InventoryWorkflow};
    use models::errors::{HospitalError, StoreError};
    use models::inputs::NumericInput;
    use models::medical::{NewAppointment, NewMedicine, Patient};

    async fn seeded(fixture: &Fixture, stock: f64) -> (Uuid, Uuid) {
        fixture.patient("p-1", "Pat Doe").await;
        fixture.doctor("d-1", "Dr. Who").await;
        let appointment = AppointmentWorkflow::new(fixture.store.clone(), fixture.resolver.clone())
            .create(&NewAppointment {
                patient_id: Some("p-1".into()),
                doctor_id: Some("d-1".into()),
                appointment_date: Some("2025-01-10".into()),
                appointment_time: Some("10:00".into()),
                symptoms: Some("fever".into()),
            })
            .await
            .unwrap();
        let medicine = InventoryWorkflow::new(fixture.store.clone())
            .create(&NewMedicine {
                name: Some("Ibuprofen".into()),
                category: Some("analgesic".into()),
                stock_quantity: Some(NumericInput::from(stock)),
                price_per_unit: Some(NumericInput::from(3.0)),
                ..Default::default()
            })
            .await
            .unwrap();
        (appointment.id, medicine.id)
    }

    fn request(appointment_id: Uuid, medicine_id: Uuid) -> NewPrescription {
        NewPrescription {
            appointment_id: Some(appointment_id.to_string()),
            medicine_id: Some(medicine_id.to_string()),
            dosage: Some("200mg".into()),
            frequency: Some("every 8 hours".into()),
            duration: Some("5 days".into()),
            instructions: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn listing_joins_medicine_and_doctor() {
        let fixture = Fixture::new();
        let (appointment_id, medicine_id) = seeded(&fixture, 10.0).await;
        let workflow = PrescriptionWorkflow::new(fixture.store.clone(), fixture.resolver.clone(), false);
        let created = workflow.create(&request(appointment_id, medicine_id)).await.unwrap();
        assert!(created.instructions.is_none());

        let views = workflow
            .list(&PrescriptionQuery { patient_id: Some("p-1".into()) })
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].medicine.as_ref().unwrap().name, "Ibuprofen");
        let doctor = views[0].appointment.as_ref().and_then(|a| a.doctor.as_ref()).unwrap();
        assert_eq!(doctor.user.as_ref().unwrap().full_name, "Dr. Who");

        let stock = fixture.store.get_medicine(medicine_id).await.unwrap().unwrap().stock_quantity;
        assert_eq!(stock, 10);
    }

    #[tokio::test]
    async fn deleted_medicine_renders_as_absent() {
        let fixture = Fixture::new();
        let (appointment_id, medicine_id) = seeded(&fixture, 10.0).await;
        let workflow = PrescriptionWorkflow::new(fixture.store.clone(), fixture.resolver.clone(), false);
        workflow.create(&request(appointment_id, medicine_id)).await.unwrap();
        fixture.store.delete_medicine(medicine_id).await.unwrap();

        let views = workflow.list(&PrescriptionQuery::default()).await.unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].medicine.is_none());
    }

    #[tokio::test]
    async fn stock_decrement_is_opt_in_and_bounded() {
        let fixture = Fixture::new();
        let (appointment_id, medicine_id) = seeded(&fixture, 1.0).await;
        let workflow = PrescriptionWorkflow::new(fixture.store.clone(), fixture.resolver.clone(), true);

        workflow.create(&request(appointment_id, medicine_id)).await.unwrap();
        let err = workflow.create(&request(appointment_id, medicine_id)).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
        assert_eq!(fixture.store.get_medicine(medicine_id).await.unwrap().unwrap().stock_quantity, 0);
        assert_eq!(fixture.store.list_prescriptions(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_appointment_is_a_store_error() {
        let fixture = Fixture::new();
        let (_, medicine_id) = seeded(&fixture, 5.0).await;
        let workflow = PrescriptionWorkflow::new(fixture.store.clone(), fixture.resolver.clone(), false);
        let err = workflow.create(&request(Uuid::new_v4(), medicine_id)).await.unwrap_err();
        assert!(matches!(err, HospitalError::Store(StoreError::ForeignKeyViolation { .. })));
    }

    #[tokio::test]
    async fn unresolvable_patient_lists_nothing() {
        let fixture = Fixture::new();
        let (appointment_id, medicine_id) = seeded(&fixture, 10.0).await;
        let workflow = PrescriptionWorkflow::new(fixture.store.clone(), fixture.resolver.clone(), false);
        workflow.create(&request(appointment_id, medicine_id)).await.unwrap();

        for patient_id in ["stranger", "d-1"] {
            let views = workflow
                .list(&PrescriptionQuery { patient_id: Some(patient_id.into()) })
                .await
                .unwrap();
            assert!(views.is_empty(), "{} should match nothing", patient_id);
        }
    }

    #[tokio::test]
    async fn patient_without_appointments_skips_the_prescription_table() {
        let patient = Patient::new("p-1", None, None);
        let mut store = MockHospitalStore::new();
        store
            .expect_find_patient_by_user()
            .returning(move |_| Ok(Some(patient.clone())));
        store.expect_list_appointments().times(1).returning(|_| Ok(Vec::new()));
        store.expect_list_prescriptions().never();

        let store: Arc<dyn HospitalStore> = Arc::new(store);
        let resolver = Arc::new(crate::resolver::CachedIdentityResolver::new(
            store.clone(),
            &crate::config::ResolverConfig::default(),
        ));
        let workflow = PrescriptionWorkflow::new(store, resolver, false);
        let views = workflow
            .list(&PrescriptionQuery { patient_id: Some("p-1".into()) })
            .await
            .unwrap();
        assert!(views.is_empty());
    }
}
