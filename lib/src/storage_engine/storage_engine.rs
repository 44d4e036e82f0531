// lib/src/storage_engine/storage_engine.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use models::errors::StoreResult;
use models::medical::{
    Appointment, AppointmentFilter, Bill, Doctor, Medicine, MedicinePatch, Patient, Prescription, RoleProfile,
    Room, RoomAssignment, User,
};

use crate::config::StorageEngineType;

/// Table-level operations over the hospital's records.
///
/// Engines behave like a small relational store: inserts check foreign
/// keys and unique columns, updates of a missing row fail with
/// `StoreError::RowNotFound`, and the operations that touch more than one
/// table (`register_user`, `occupy_room`, `release_room`,
/// `insert_prescription` with a stock decrement) commit all of their writes
/// or none of them. Listing order is unspecified; callers sort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HospitalStore: Send + Sync + 'static {
    fn engine_type(&self) -> StorageEngineType;

    /// Inserts the user and its role record together.
    async fn register_user(&self, user: &User, profile: &RoleProfile) -> StoreResult<()>;
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_patient_by_user(&self, user_id: &str) -> StoreResult<Option<Patient>>;
    async fn find_doctor_by_user(&self, user_id: &str) -> StoreResult<Option<Doctor>>;
    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>>;
    async fn get_doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>>;
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>>;

    async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<()>;
    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>>;
    async fn update_appointment(&self, appointment: &Appointment) -> StoreResult<()>;
    async fn list_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>>;

    async fn insert_medicine(&self, medicine: &Medicine) -> StoreResult<()>;
    async fn get_medicine(&self, id: Uuid) -> StoreResult<Option<Medicine>>;
    /// Applies the patch to the stored row in one step, so a concurrent stock
    /// decrement is never overwritten by stale fields.
    async fn patch_medicine(&self, id: Uuid, patch: MedicinePatch) -> StoreResult<Medicine>;
    /// Hard delete. Deleting an absent id is not an error.
    async fn delete_medicine(&self, id: Uuid) -> StoreResult<()>;
    async fn list_medicines(&self) -> StoreResult<Vec<Medicine>>;

    /// With `decrement_stock`, the referenced medicine loses one unit in the
    /// same transaction and `StoreError::InsufficientStock` aborts both.
    async fn insert_prescription(&self, prescription: &Prescription, decrement_stock: bool) -> StoreResult<()>;
    /// `None` lists every prescription; `Some` restricts to those appointments.
    async fn list_prescriptions(&self, appointment_ids: Option<Vec<Uuid>>) -> StoreResult<Vec<Prescription>>;

    async fn insert_room(&self, room: &Room) -> StoreResult<()>;
    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>>;
    async fn list_rooms(&self) -> StoreResult<Vec<Room>>;
    async fn list_active_assignments(&self) -> StoreResult<Vec<RoomAssignment>>;
    /// Marks the room occupied and inserts the active assignment. Fails with
    /// `RoomUnavailable` unless the room is currently available.
    async fn occupy_room(&self, assignment: &RoomAssignment) -> StoreResult<()>;
    /// Discharges an active assignment and makes its room available again.
    async fn release_room(&self, assignment_id: Uuid, discharge_date: NaiveDate) -> StoreResult<RoomAssignment>;

    async fn insert_bill(&self, bill: &Bill) -> StoreResult<()>;
    async fn get_bill(&self, id: Uuid) -> StoreResult<Option<Bill>>;
    async fn update_bill(&self, bill: &Bill) -> StoreResult<()>;
    async fn list_bills(&self) -> StoreResult<Vec<Bill>>;
}
