// lib/src/workflows/room.rs

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use models::errors::HospitalResult;
use models::inputs::{
    optional_text, required_amount, required_date, required_integer, required_text, required_uuid,
};
use models::medical::{
    AssignedPatient, AssignmentView, NewRoom, NewRoomAssignment, Role, Room, RoomAssignment,
    RoomDischarge, RoomStatus, RoomView,
};

use super::{require_record, RecordJoiner};
use crate::resolver::IdentityResolver;
use crate::storage_engine::HospitalStore;

/// Ward rooms and the patients admitted to them.
pub struct RoomWorkflow {
    store: Arc<dyn HospitalStore>,
    resolver: Arc<dyn IdentityResolver>,
}

impl RoomWorkflow {
    pub fn new(store: Arc<dyn HospitalStore>, resolver: Arc<dyn IdentityResolver>) -> Self {
        RoomWorkflow { store, resolver }
    }

    pub async fn register_room(&self, request: &NewRoom) -> HospitalResult<Room> {
        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            room_number: required_text(&request.room_number, "room_number")?,
            room_type: required_text(&request.room_type, "room_type")?,
            floor: required_integer(&request.floor, "floor")?,
            daily_rate: required_amount(&request.daily_rate, "daily_rate")?,
            status: RoomStatus::Available,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_room(&room).await?;
        info!(room_id = %room.id, room_number = %room.room_number, "registered room");
        Ok(room)
    }

    /// Admits a patient. The room flips to occupied in the same store
    /// transaction that records the assignment.
    pub async fn assign(&self, request: &NewRoomAssignment) -> HospitalResult<RoomAssignment> {
        let patient_user = required_text(&request.patient_user_id, "patient_user_id")?;
        let room_id = required_uuid(&request.room_id, "room_id")?;
        let admission_date = required_date(&request.admission_date, "admission_date")?;

        let patient_id = require_record(self.resolver.as_ref(), Role::Patient, &patient_user).await?;
        let assignment = RoomAssignment::admit(patient_id, room_id, admission_date);
        self.store.occupy_room(&assignment).await?;
        info!(assignment_id = %assignment.id, %room_id, %patient_id, "assigned room");
        Ok(assignment)
    }

    /// Discharges an active assignment; the date defaults to today.
    pub async fn discharge(&self, request: &RoomDischarge) -> HospitalResult<RoomAssignment> {
        let assignment_id = required_uuid(&request.assignment_id, "assignment_id")?;
        let discharge_date = match optional_text(&request.discharge_date) {
            Some(date) => required_date(&Some(date), "discharge_date")?,
            None => Utc::now().date_naive(),
        };
        let assignment = self.store.release_room(assignment_id, discharge_date).await?;
        info!(%assignment_id, room_id = %assignment.room_id, "discharged patient");
        Ok(assignment)
    }

    /// Every room by number, with its active assignment nested when present.
    pub async fn list(&self) -> HospitalResult<Vec<RoomView>> {
        let mut rooms = self.store.list_rooms().await?;
        // Numeric room numbers first, in numeric order; the rest by text.
        rooms.sort_by_cached_key(|room| {
            let number = room.room_number.trim().parse::<u64>().ok();
            (number.is_none(), number, room.room_number.clone())
        });

        let mut active: HashMap<Uuid, Vec<RoomAssignment>> = HashMap::new();
        for assignment in self.store.list_active_assignments().await? {
            active.entry(assignment.room_id).or_default().push(assignment);
        }

        let mut joiner = RecordJoiner::new(self.store.as_ref());
        let mut views = Vec::with_capacity(rooms.len());
        for room in rooms {
            let mut room_assignments = Vec::new();
            for assignment in active.remove(&room.id).unwrap_or_default() {
                let patient = match joiner.patient(assignment.patient_id).await? {
                    Some(patient) => Some(AssignedPatient { user: joiner.user_name(&patient.user_id).await? }),
                    None => None,
                };
                room_assignments.push(AssignmentView { assignment, patient });
            }
            views.push(RoomView { room, room_assignments });
        }
        Ok(views)
    }
}
