// lib/src/storage_engine/inmemory_storage.rs

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use models::errors::{StoreError, StoreResult};
use models::medical::{
    Appointment, AppointmentFilter, AssignmentStatus, Bill, Doctor, Medicine, MedicinePatch, Patient,
    Prescription, RoleProfile, Room, RoomAssignment, User,
};

use super::storage_engine::HospitalStore;
use crate::config::StorageEngineType;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    patients: HashMap<Uuid, Patient>,
    doctors: HashMap<Uuid, Doctor>,
    appointments: HashMap<Uuid, Appointment>,
    medicines: HashMap<Uuid, Medicine>,
    prescriptions: HashMap<Uuid, Prescription>,
    rooms: HashMap<Uuid, Room>,
    room_assignments: HashMap<Uuid, RoomAssignment>,
    billing: HashMap<Uuid, Bill>,
}

impl Tables {
    fn require_patient(&self, id: Uuid, table: &'static str) -> StoreResult<()> {
        if self.patients.contains_key(&id) {
            Ok(())
        } else {
            Err(fk(table, "patient_id", id))
        }
    }

    fn require_appointment(&self, id: Uuid, table: &'static str) -> StoreResult<()> {
        if self.appointments.contains_key(&id) {
            Ok(())
        } else {
            Err(fk(table, "appointment_id", id))
        }
    }
}

fn fk(table: &'static str, column: &'static str, value: impl ToString) -> StoreError {
    StoreError::ForeignKeyViolation { table, column, value: value.to_string() }
}

fn missing(table: &'static str, id: impl ToString) -> StoreError {
    StoreError::RowNotFound { table, id: id.to_string() }
}

/// Every table lives behind one lock, so each trait call is a transaction.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl HospitalStore for InMemoryStorage {
    fn engine_type(&self) -> StorageEngineType {
        StorageEngineType::InMemory
    }

    async fn register_user(&self, user: &User, profile: &RoleProfile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::UniqueViolation { table: "users", column: "id", value: user.id.clone() });
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation { table: "users", column: "email", value: user.email.clone() });
        }
        if profile.user_id() != user.id {
            return Err(fk(profile_table(profile), "user_id", profile.user_id()));
        }
        tables.users.insert(user.id.clone(), user.clone());
        match profile {
            RoleProfile::Patient(patient) => {
                tables.patients.insert(patient.id, patient.clone());
            }
            RoleProfile::Doctor(doctor) => {
                tables.doctors.insert(doctor.id, doctor.clone());
            }
        }
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_patient_by_user(&self, user_id: &str) -> StoreResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables.patients.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_doctor_by_user(&self, user_id: &str) -> StoreResult<Option<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.values().find(|d| d.user_id == user_id).cloned())
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>> {
        Ok(self.tables.read().await.doctors.get(&id).cloned())
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        Ok(self.tables.read().await.doctors.values().cloned().collect())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_patient(appointment.patient_id, "appointments")?;
        if !tables.doctors.contains_key(&appointment.doctor_id) {
            return Err(fk("appointments", "doctor_id", appointment.doctor_id));
        }
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn update_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.appointments.get_mut(&appointment.id) {
            Some(row) => {
                *row = appointment.clone();
                Ok(())
            }
            None => Err(missing("appointments", appointment.id)),
        }
    }

    async fn list_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read().await;
        Ok(tables.appointments.values().filter(|a| filter.matches(a)).cloned().collect())
    }

    async fn insert_medicine(&self, medicine: &Medicine) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let key = Medicine::name_key(&medicine.name);
        if tables.medicines.values().any(|m| Medicine::name_key(&m.name) == key) {
            return Err(StoreError::UniqueViolation { table: "medicines", column: "name", value: medicine.name.clone() });
        }
        tables.medicines.insert(medicine.id, medicine.clone());
        Ok(())
    }

    async fn get_medicine(&self, id: Uuid) -> StoreResult<Option<Medicine>> {
        Ok(self.tables.read().await.medicines.get(&id).cloned())
    }

    async fn patch_medicine(&self, id: Uuid, patch: MedicinePatch) -> StoreResult<Medicine> {
        let mut tables = self.tables.write().await;
        let row = tables.medicines.get_mut(&id).ok_or_else(|| missing("medicines", id))?;
        patch.apply(row);
        Ok(row.clone())
    }

    async fn delete_medicine(&self, id: Uuid) -> StoreResult<()> {
        self.tables.write().await.medicines.remove(&id);
        Ok(())
    }

    async fn list_medicines(&self) -> StoreResult<Vec<Medicine>> {
        Ok(self.tables.read().await.medicines.values().cloned().collect())
    }

    async fn insert_prescription(&self, prescription: &Prescription, decrement_stock: bool) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_appointment(prescription.appointment_id, "prescriptions")?;
        let medicine = tables
            .medicines
            .get_mut(&prescription.medicine_id)
            .ok_or_else(|| fk("prescriptions", "medicine_id", prescription.medicine_id))?;
        if decrement_stock {
            if medicine.stock_quantity == 0 {
                return Err(StoreError::InsufficientStock {
                    medicine_id: medicine.id.to_string(),
                    available: 0,
                });
            }
            medicine.stock_quantity -= 1;
            medicine.updated_at = Utc::now();
        }
        tables.prescriptions.insert(prescription.id, prescription.clone());
        Ok(())
    }

    async fn list_prescriptions(&self, appointment_ids: Option<Vec<Uuid>>) -> StoreResult<Vec<Prescription>> {
        let tables = self.tables.read().await;
        Ok(tables
            .prescriptions
            .values()
            .filter(|p| appointment_ids.as_ref().is_none_or(|ids| ids.contains(&p.appointment_id)))
            .cloned()
            .collect())
    }

    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.rooms.values().any(|r| r.room_number == room.room_number) {
            return Err(StoreError::UniqueViolation { table: "rooms", column: "room_number", value: room.room_number.clone() });
        }
        tables.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        Ok(self.tables.read().await.rooms.get(&id).cloned())
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        Ok(self.tables.read().await.rooms.values().cloned().collect())
    }

    async fn list_active_assignments(&self) -> StoreResult<Vec<RoomAssignment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .room_assignments
            .values()
            .filter(|a| a.status == AssignmentStatus::Active)
            .cloned()
            .collect())
    }

    async fn occupy_room(&self, assignment: &RoomAssignment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_patient(assignment.patient_id, "room_assignments")?;
        let room = tables
            .rooms
            .get_mut(&assignment.room_id)
            .ok_or_else(|| missing("rooms", assignment.room_id))?;
        room.occupy()?;
        tables.room_assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn release_room(&self, assignment_id: Uuid, discharge_date: NaiveDate) -> StoreResult<RoomAssignment> {
        let mut tables = self.tables.write().await;
        let assignment = tables
            .room_assignments
            .get(&assignment_id)
            .cloned()
            .ok_or_else(|| missing("room_assignments", assignment_id))?;
        let room_id = assignment.room_id;
        let discharged = assignment.discharge(discharge_date)?;
        let room = tables.rooms.get_mut(&room_id).ok_or_else(|| missing("rooms", room_id))?;
        room.vacate();
        tables.room_assignments.insert(assignment_id, discharged.clone());
        Ok(discharged)
    }

    async fn insert_bill(&self, bill: &Bill) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_patient(bill.patient_id, "billing")?;
        if let Some(appointment_id) = bill.appointment_id {
            tables.require_appointment(appointment_id, "billing")?;
        }
        tables.billing.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn get_bill(&self, id: Uuid) -> StoreResult<Option<Bill>> {
        Ok(self.tables.read().await.billing.get(&id).cloned())
    }

    async fn update_bill(&self, bill: &Bill) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.billing.get_mut(&bill.id) {
            Some(row) => {
                *row = bill.clone();
                Ok(())
            }
            None => Err(missing("billing", bill.id)),
        }
    }

    async fn list_bills(&self) -> StoreResult<Vec<Bill>> {
        Ok(self.tables.read().await.billing.values().cloned().collect())
    }
}

fn profile_table(profile: &RoleProfile) -> &'static str {
    match profile {
        RoleProfile::Patient(_) => "patients",
        RoleProfile::Doctor(_) => "doctors",
    }
}
