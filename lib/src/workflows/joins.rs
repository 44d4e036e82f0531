// lib/src/workflows/joins.rs
// Per-request join helper used by the listing workflows. Each record is
// fetched at most once per listing, hits and misses alike.

use std::collections::HashMap;
use uuid::Uuid;

use models::errors::StoreResult;
use models::medical::{
    Appointment, Doctor, DoctorDetail, DoctorName, DoctorUser, Medicine, Patient, PatientDetail,
    User, UserName, UserSummary,
};

use crate::storage_engine::HospitalStore;

pub struct RecordJoiner<'a> {
    store: &'a dyn HospitalStore,
    users: HashMap<String, Option<User>>,
    patients: HashMap<Uuid, Option<Patient>>,
    doctors: HashMap<Uuid, Option<Doctor>>,
    appointments: HashMap<Uuid, Option<Appointment>>,
    medicines: HashMap<Uuid, Option<Medicine>>,
}

impl<'a> RecordJoiner<'a> {
    pub fn new(store: &'a dyn HospitalStore) -> Self {
        RecordJoiner {
            store,
            users: HashMap::new(),
            patients: HashMap::new(),
            doctors: HashMap::new(),
            appointments: HashMap::new(),
            medicines: HashMap::new(),
        }
    }

    pub async fn user(&mut self, id: &str) -> StoreResult<Option<User>> {
        if let Some(cached) = self.users.get(id) {
            return Ok(cached.clone());
        }
        let found = self.store.get_user(id).await?;
        self.users.insert(id.to_string(), found.clone());
        Ok(found)
    }

    pub async fn patient(&mut self, id: Uuid) -> StoreResult<Option<Patient>> {
        if let Some(cached) = self.patients.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.store.get_patient(id).await?;
        self.patients.insert(id, found.clone());
        Ok(found)
    }

    pub async fn doctor(&mut self, id: Uuid) -> StoreResult<Option<Doctor>> {
        if let Some(cached) = self.doctors.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.store.get_doctor(id).await?;
        self.doctors.insert(id, found.clone());
        Ok(found)
    }

    pub async fn appointment(&mut self, id: Uuid) -> StoreResult<Option<Appointment>> {
        if let Some(cached) = self.appointments.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.store.get_appointment(id).await?;
        self.appointments.insert(id, found.clone());
        Ok(found)
    }

    pub async fn medicine(&mut self, id: Uuid) -> StoreResult<Option<Medicine>> {
        if let Some(cached) = self.medicines.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.store.get_medicine(id).await?;
        self.medicines.insert(id, found.clone());
        Ok(found)
    }

    pub async fn user_name(&mut self, user_id: &str) -> StoreResult<Option<UserName>> {
        Ok(self.user(user_id).await?.as_ref().map(UserName::from))
    }

    pub async fn patient_detail(&mut self, id: Uuid) -> StoreResult<Option<PatientDetail>> {
        let Some(patient) = self.patient(id).await? else {
            return Ok(None);
        };
        let user = self.user(&patient.user_id).await?;
        Ok(Some(PatientDetail {
            id: patient.id,
            blood_group: patient.blood_group,
            emergency_contact: patient.emergency_contact,
            user: user.as_ref().map(UserSummary::from),
        }))
    }

    pub async fn doctor_detail(&mut self, id: Uuid) -> StoreResult<Option<DoctorDetail>> {
        let Some(doctor) = self.doctor(id).await? else {
            return Ok(None);
        };
        let user = self.user(&doctor.user_id).await?;
        Ok(Some(DoctorDetail {
            id: doctor.id,
            specialization: doctor.specialization,
            license_number: doctor.license_number,
            department: doctor.department,
            user: user.as_ref().map(|u| DoctorUser::from(&UserSummary::from(u))),
        }))
    }

    /// `doctor{user{full_name}}`, or `None` when the doctor is gone.
    pub async fn doctor_name(&mut self, id: Uuid) -> StoreResult<Option<DoctorName>> {
        let Some(doctor) = self.doctor(id).await? else {
            return Ok(None);
        };
        Ok(Some(DoctorName { user: self.user_name(&doctor.user_id).await? }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::MockHospitalStore;

    #[tokio::test]
    async fn each_record_is_fetched_once() {
        let doctor = Doctor::new("doc-1", None, None, None, None);
        let doctor_id = doctor.id;
        let mut store = MockHospitalStore::new();
        store.expect_get_doctor().times(1).returning(move |_| Ok(Some(doctor.clone())));
        store.expect_get_user().times(1).returning(|_| Ok(None));

        let mut joiner = RecordJoiner::new(&store);
        for _ in 0..3 {
            let name = joiner.doctor_name(doctor_id).await.unwrap().unwrap();
            assert!(name.user.is_none());
        }
    }
}
