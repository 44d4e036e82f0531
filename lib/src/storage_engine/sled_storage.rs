// lib/src/storage_engine/sled_storage.rs
// Sled-backed store: one tree per table plus the index trees that back the
// unique columns. Multi-table writes run as sled transactions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bincode::{
    config::{self, BigEndian, Configuration, Fixint},
    serde::{decode_from_slice, encode_to_vec},
};
use chrono::{NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sled::transaction::{abort, TransactionError, TransactionResult, Transactional};
use sled::{Db, Tree};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use models::errors::{StoreError, StoreResult};
use models::medical::{
    Appointment, AppointmentFilter, AssignmentStatus, Bill, Doctor, Medicine, MedicinePatch, Patient,
    Prescription, RoleProfile, Room, RoomAssignment, User,
};

use super::storage_engine::HospitalStore;
use crate::config::StorageEngineType;

/// Opens (creating if needed) the sled database under `path`.
pub fn open_sled_db(path: &Path) -> Result<Db> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create database directory at {}", path.display()))?;
    let db = sled::Config::new()
        .path(path)
        .open()
        .with_context(|| format!("Failed to open Sled database at {}", path.display()))?;
    info!(path = %path.display(), "opened sled database");
    Ok(db)
}

/// Provides a standard bincode configuration.
fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    encode_to_vec(value, bincode_config()).map_err(|e| StoreError::Codec(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    decode_from_slice(bytes, bincode_config())
        .map(|(value, _)| value)
        .map_err(|e| StoreError::Codec(e.to_string()))
}

fn decode_uuid(bytes: &[u8]) -> StoreResult<Uuid> {
    Uuid::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}

fn key(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn backend(err: sled::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn settle<T>(result: TransactionResult<T, StoreError>) -> StoreResult<T> {
    result.map_err(|err| match err {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => backend(err),
    })
}

fn fk(table: &'static str, column: &'static str, value: impl ToString) -> StoreError {
    StoreError::ForeignKeyViolation { table, column, value: value.to_string() }
}

fn unique(table: &'static str, column: &'static str, value: impl ToString) -> StoreError {
    StoreError::UniqueViolation { table, column, value: value.to_string() }
}

fn missing(table: &'static str, id: impl ToString) -> StoreError {
    StoreError::RowNotFound { table, id: id.to_string() }
}

#[derive(Debug, Clone)]
pub struct SledStorage {
    users: Tree,
    users_by_email: Tree,
    patients: Tree,
    patients_by_user: Tree,
    doctors: Tree,
    doctors_by_user: Tree,
    appointments: Tree,
    medicines: Tree,
    medicines_by_name: Tree,
    prescriptions: Tree,
    rooms: Tree,
    rooms_by_number: Tree,
    room_assignments: Tree,
    billing: Tree,
}

impl SledStorage {
    pub fn new(db: &Db) -> StoreResult<Self> {
        let open = |name: &str| db.open_tree(name).map_err(backend);
        Ok(Self {
            users: open("users")?,
            users_by_email: open("users_by_email")?,
            patients: open("patients")?,
            patients_by_user: open("patients_by_user")?,
            doctors: open("doctors")?,
            doctors_by_user: open("doctors_by_user")?,
            appointments: open("appointments")?,
            medicines: open("medicines")?,
            medicines_by_name: open("medicines_by_name")?,
            prescriptions: open("prescriptions")?,
            rooms: open("rooms")?,
            rooms_by_number: open("rooms_by_number")?,
            room_assignments: open("room_assignments")?,
            billing: open("billing")?,
        })
    }

    fn fetch<T: DeserializeOwned>(tree: &Tree, key: &[u8]) -> StoreResult<Option<T>> {
        match tree.get(key).map_err(backend)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(tree: &Tree) -> StoreResult<Vec<T>> {
        tree.iter()
            .values()
            .map(|value| decode(&value.map_err(backend)?))
            .collect()
    }

    fn exists(tree: &Tree, id: Uuid) -> StoreResult<bool> {
        tree.contains_key(key(id)).map_err(backend)
    }

    fn replace(tree: &Tree, table: &'static str, id: Uuid, bytes: Vec<u8>) -> StoreResult<()> {
        if !Self::exists(tree, id)? {
            return Err(missing(table, id));
        }
        tree.insert(key(id), bytes).map_err(backend)?;
        Ok(())
    }

    fn by_index<T: DeserializeOwned>(index: &Tree, table: &Tree, lookup: &str) -> StoreResult<Option<T>> {
        match index.get(lookup.as_bytes()).map_err(backend)? {
            Some(id) => Self::fetch(table, &id),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HospitalStore for SledStorage {
    fn engine_type(&self) -> StorageEngineType {
        StorageEngineType::Sled
    }

    async fn register_user(&self, user: &User, profile: &RoleProfile) -> StoreResult<()> {
        if profile.user_id() != user.id {
            let table = match profile {
                RoleProfile::Patient(_) => "patients",
                RoleProfile::Doctor(_) => "doctors",
            };
            return Err(fk(table, "user_id", profile.user_id()));
        }
        let user_bytes = encode(user)?;
        let (profile_tree, profile_index, profile_table, profile_bytes) = match profile {
            RoleProfile::Patient(patient) => (&self.patients, &self.patients_by_user, "patients", encode(patient)?),
            RoleProfile::Doctor(doctor) => (&self.doctors, &self.doctors_by_user, "doctors", encode(doctor)?),
        };
        let profile_key = key(profile.record_id());

        let result = (&self.users, &self.users_by_email, profile_tree, profile_index).transaction(
            |(users, by_email, records, by_user)| {
                if users.get(user.id.as_bytes())?.is_some() {
                    return abort(unique("users", "id", &user.id));
                }
                if by_email.get(user.email.as_bytes())?.is_some() {
                    return abort(unique("users", "email", &user.email));
                }
                if by_user.get(user.id.as_bytes())?.is_some() {
                    return abort(unique(profile_table, "user_id", &user.id));
                }
                users.insert(user.id.as_bytes(), user_bytes.clone())?;
                by_email.insert(user.email.as_bytes(), user.id.as_bytes())?;
                records.insert(profile_key.clone(), profile_bytes.clone())?;
                by_user.insert(user.id.as_bytes(), profile_key.clone())?;
                Ok(())
            },
        );
        settle(result)?;
        debug!(user_id = %user.id, role = %profile.role(), "registered user");
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        Self::fetch(&self.users, id.as_bytes())
    }

    async fn find_patient_by_user(&self, user_id: &str) -> StoreResult<Option<Patient>> {
        Self::by_index(&self.patients_by_user, &self.patients, user_id)
    }

    async fn find_doctor_by_user(&self, user_id: &str) -> StoreResult<Option<Doctor>> {
        Self::by_index(&self.doctors_by_user, &self.doctors, user_id)
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Self::fetch(&self.patients, &key(id))
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>> {
        Self::fetch(&self.doctors, &key(id))
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        Self::scan(&self.doctors)
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        if !Self::exists(&self.patients, appointment.patient_id)? {
            return Err(fk("appointments", "patient_id", appointment.patient_id));
        }
        if !Self::exists(&self.doctors, appointment.doctor_id)? {
            return Err(fk("appointments", "doctor_id", appointment.doctor_id));
        }
        self.appointments
            .insert(key(appointment.id), encode(appointment)?)
            .map_err(backend)?;
        Ok(())
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Self::fetch(&self.appointments, &key(id))
    }

    async fn update_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        Self::replace(&self.appointments, "appointments", appointment.id, encode(appointment)?)
    }

    async fn list_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let all: Vec<Appointment> = Self::scan(&self.appointments)?;
        Ok(all.into_iter().filter(|a| filter.matches(a)).collect())
    }

    async fn insert_medicine(&self, medicine: &Medicine) -> StoreResult<()> {
        let bytes = encode(medicine)?;
        let name_key = Medicine::name_key(&medicine.name);
        let result = (&self.medicines, &self.medicines_by_name).transaction(|(medicines, by_name)| {
            if by_name.get(name_key.as_bytes())?.is_some() {
                return abort(unique("medicines", "name", &medicine.name));
            }
            medicines.insert(key(medicine.id), bytes.clone())?;
            by_name.insert(name_key.as_bytes(), key(medicine.id))?;
            Ok(())
        });
        settle(result)
    }

    async fn get_medicine(&self, id: Uuid) -> StoreResult<Option<Medicine>> {
        Self::fetch(&self.medicines, &key(id))
    }

    async fn patch_medicine(&self, id: Uuid, patch: MedicinePatch) -> StoreResult<Medicine> {
        let result = self.medicines.transaction(|medicines| {
            let Some(stored) = medicines.get(key(id))? else {
                return abort(missing("medicines", id));
            };
            let mut medicine: Medicine = match decode(&stored) {
                Ok(medicine) => medicine,
                Err(err) => return abort(err),
            };
            patch.apply(&mut medicine);
            match encode(&medicine) {
                Ok(updated) => medicines.insert(key(id), updated)?,
                Err(err) => return abort(err),
            };
            Ok(medicine)
        });
        settle(result)
    }

    async fn delete_medicine(&self, id: Uuid) -> StoreResult<()> {
        let result = (&self.medicines, &self.medicines_by_name).transaction(|(medicines, by_name)| {
            if let Some(bytes) = medicines.remove(key(id))? {
                let medicine: Medicine = match decode(&bytes) {
                    Ok(medicine) => medicine,
                    Err(err) => return abort(err),
                };
                by_name.remove(Medicine::name_key(&medicine.name).as_bytes())?;
            }
            Ok(())
        });
        settle(result)
    }

    async fn list_medicines(&self) -> StoreResult<Vec<Medicine>> {
        Self::scan(&self.medicines)
    }

    async fn insert_prescription(&self, prescription: &Prescription, decrement_stock: bool) -> StoreResult<()> {
        let bytes = encode(prescription)?;
        let result = (&self.appointments, &self.medicines, &self.prescriptions).transaction(
            |(appointments, medicines, prescriptions)| {
                if appointments.get(key(prescription.appointment_id))?.is_none() {
                    return abort(fk("prescriptions", "appointment_id", prescription.appointment_id));
                }
                let Some(stored) = medicines.get(key(prescription.medicine_id))? else {
                    return abort(fk("prescriptions", "medicine_id", prescription.medicine_id));
                };
                if decrement_stock {
                    let mut medicine: Medicine = match decode(&stored) {
                        Ok(medicine) => medicine,
                        Err(err) => return abort(err),
                    };
                    if medicine.stock_quantity == 0 {
                        return abort(StoreError::InsufficientStock {
                            medicine_id: medicine.id.to_string(),
                            available: 0,
                        });
                    }
                    medicine.stock_quantity -= 1;
                    medicine.updated_at = Utc::now();
                    match encode(&medicine) {
                        Ok(updated) => medicines.insert(key(medicine.id), updated)?,
                        Err(err) => return abort(err),
                    };
                }
                prescriptions.insert(key(prescription.id), bytes.clone())?;
                Ok(())
            },
        );
        settle(result)
    }

    async fn list_prescriptions(&self, appointment_ids: Option<Vec<Uuid>>) -> StoreResult<Vec<Prescription>> {
        let all: Vec<Prescription> = Self::scan(&self.prescriptions)?;
        Ok(match appointment_ids {
            Some(ids) => all.into_iter().filter(|p| ids.contains(&p.appointment_id)).collect(),
            None => all,
        })
    }

    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let bytes = encode(room)?;
        let result = (&self.rooms, &self.rooms_by_number).transaction(|(rooms, by_number)| {
            if by_number.get(room.room_number.as_bytes())?.is_some() {
                return abort(unique("rooms", "room_number", &room.room_number));
            }
            rooms.insert(key(room.id), bytes.clone())?;
            by_number.insert(room.room_number.as_bytes(), key(room.id))?;
            Ok(())
        });
        settle(result)
    }

    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        Self::fetch(&self.rooms, &key(id))
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        Self::scan(&self.rooms)
    }

    async fn list_active_assignments(&self) -> StoreResult<Vec<RoomAssignment>> {
        let all: Vec<RoomAssignment> = Self::scan(&self.room_assignments)?;
        Ok(all.into_iter().filter(|a| a.status == AssignmentStatus::Active).collect())
    }

    async fn occupy_room(&self, assignment: &RoomAssignment) -> StoreResult<()> {
        let bytes = encode(assignment)?;
        let result = (&self.patients, &self.rooms, &self.room_assignments).transaction(
            |(patients, rooms, assignments)| {
                if patients.get(key(assignment.patient_id))?.is_none() {
                    return abort(fk("room_assignments", "patient_id", assignment.patient_id));
                }
                let Some(stored) = rooms.get(key(assignment.room_id))? else {
                    return abort(missing("rooms", assignment.room_id));
                };
                let mut room: Room = match decode(&stored) {
                    Ok(room) => room,
                    Err(err) => return abort(err),
                };
                if let Err(err) = room.occupy() {
                    return abort(err);
                }
                match encode(&room) {
                    Ok(updated) => rooms.insert(key(room.id), updated)?,
                    Err(err) => return abort(err),
                };
                assignments.insert(key(assignment.id), bytes.clone())?;
                Ok(())
            },
        );
        settle(result)
    }

    async fn release_room(&self, assignment_id: Uuid, discharge_date: NaiveDate) -> StoreResult<RoomAssignment> {
        let result = (&self.rooms, &self.room_assignments).transaction(|(rooms, assignments)| {
            let Some(stored) = assignments.get(key(assignment_id))? else {
                return abort(missing("room_assignments", assignment_id));
            };
            let assignment: RoomAssignment = match decode(&stored) {
                Ok(assignment) => assignment,
                Err(err) => return abort(err),
            };
            let room_id = assignment.room_id;
            let discharged = match assignment.discharge(discharge_date) {
                Ok(discharged) => discharged,
                Err(err) => return abort(err),
            };
            let Some(stored_room) = rooms.get(key(room_id))? else {
                return abort(missing("rooms", room_id));
            };
            let mut room: Room = match decode(&stored_room) {
                Ok(room) => room,
                Err(err) => return abort(err),
            };
            room.vacate();
            let (room_bytes, assignment_bytes) = match (encode(&room), encode(&discharged)) {
                (Ok(r), Ok(a)) => (r, a),
                (Err(err), _) | (_, Err(err)) => return abort(err),
            };
            rooms.insert(key(room.id), room_bytes)?;
            assignments.insert(key(assignment_id), assignment_bytes)?;
            Ok(discharged)
        });
        settle(result)
    }

    async fn insert_bill(&self, bill: &Bill) -> StoreResult<()> {
        if !Self::exists(&self.patients, bill.patient_id)? {
            return Err(fk("billing", "patient_id", bill.patient_id));
        }
        if let Some(appointment_id) = bill.appointment_id {
            if !Self::exists(&self.appointments, appointment_id)? {
                return Err(fk("billing", "appointment_id", appointment_id));
            }
        }
        self.billing.insert(key(bill.id), encode(bill)?).map_err(backend)?;
        Ok(())
    }

    async fn get_bill(&self, id: Uuid) -> StoreResult<Option<Bill>> {
        Self::fetch(&self.billing, &key(id))
    }

    async fn update_bill(&self, bill: &Bill) -> StoreResult<()> {
        Self::replace(&self.billing, "billing", bill.id, encode(bill)?)
    }

    async fn list_bills(&self) -> StoreResult<Vec<Bill>> {
        Self::scan(&self.billing)
    }
}
