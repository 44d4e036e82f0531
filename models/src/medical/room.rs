// models/src/medical/room.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::inputs::NumericInput;
use crate::lifecycle::Lifecycle;
use crate::medical::UserName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }
}

impl Lifecycle for RoomStatus {
    const ENTITY: &'static str = "room";

    // Occupied rooms go back to available on discharge; maintenance is
    // entered and left only from available.
    fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (RoomStatus::Available, RoomStatus::Occupied)
                | (RoomStatus::Available, RoomStatus::Maintenance)
                | (RoomStatus::Occupied, RoomStatus::Available)
                | (RoomStatus::Maintenance, RoomStatus::Available)
        )
    }

    fn is_terminal(self) -> bool {
        false
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Discharged,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Active => "active",
            AssignmentStatus::Discharged => "discharged",
        }
    }
}

impl Lifecycle for AssignmentStatus {
    const ENTITY: &'static str = "room assignment";

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (AssignmentStatus::Active, AssignmentStatus::Discharged))
    }

    fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Discharged)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub room_number: String,
    pub room_type: String,
    pub floor: i32,
    pub daily_rate: f64,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAssignment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub room_id: Uuid,
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Moves an available room to occupied.
    pub fn occupy(&mut self) -> Result<(), StoreError> {
        if !self.status.allows(RoomStatus::Occupied) {
            return Err(StoreError::RoomUnavailable {
                room_id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        self.status = RoomStatus::Occupied;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn vacate(&mut self) {
        if self.status.allows(RoomStatus::Available) {
            self.status = RoomStatus::Available;
            self.updated_at = Utc::now();
        }
    }
}

impl RoomAssignment {
    /// Closes an active assignment on the given date.
    pub fn discharge(self, discharge_date: NaiveDate) -> Result<Self, StoreError> {
        if !self.status.allows(AssignmentStatus::Discharged) {
            return Err(StoreError::AssignmentNotActive { assignment_id: self.id.to_string() });
        }
        Ok(RoomAssignment {
            status: AssignmentStatus::Discharged,
            discharge_date: Some(discharge_date),
            ..self
        })
    }

    pub fn admit(patient_id: Uuid, room_id: Uuid, admission_date: NaiveDate) -> Self {
        RoomAssignment {
            id: Uuid::new_v4(),
            patient_id,
            room_id,
            admission_date,
            discharge_date: None,
            status: AssignmentStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// `POST /rooms/catalog` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub floor: Option<NumericInput>,
    pub daily_rate: Option<NumericInput>,
}

/// `POST /rooms` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRoomAssignment {
    pub patient_user_id: Option<String>,
    pub room_id: Option<String>,
    pub admission_date: Option<String>,
}

/// `POST /rooms/discharge` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomDischarge {
    pub assignment_id: Option<String>,
    pub discharge_date: Option<String>,
}

/// A room with its current occupant, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub room_assignments: Vec<AssignmentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: RoomAssignment,
    pub patient: Option<AssignedPatient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedPatient {
    pub user: Option<UserName>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_room_cannot_be_occupied_again() {
        assert!(RoomStatus::Available.can_transition_to(RoomStatus::Occupied));
        assert!(!RoomStatus::Occupied.allows(RoomStatus::Occupied));
        assert!(!RoomStatus::Maintenance.can_transition_to(RoomStatus::Occupied));
    }

    #[test]
    fn discharged_assignment_is_final() {
        assert!(AssignmentStatus::Active.can_transition_to(AssignmentStatus::Discharged));
        assert!(!AssignmentStatus::Discharged.can_transition_to(AssignmentStatus::Active));
    }

    fn room(status: RoomStatus) -> Room {
        Room {
            id: Uuid::new_v4(),
            room_number: "101".into(),
            room_type: "general".into(),
            floor: 1,
            daily_rate: 150.0,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_available_rooms_take_a_patient() {
        let mut ward = room(RoomStatus::Available);
        ward.occupy().unwrap();
        assert_eq!(ward.status, RoomStatus::Occupied);
        assert!(matches!(ward.occupy(), Err(StoreError::RoomUnavailable { .. })));

        let mut closed = room(RoomStatus::Maintenance);
        assert!(matches!(closed.occupy(), Err(StoreError::RoomUnavailable { .. })));
        assert_eq!(closed.status, RoomStatus::Maintenance);

        ward.vacate();
        assert_eq!(ward.status, RoomStatus::Available);
    }

    #[test]
    fn assignment_is_discharged_once() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let active = RoomAssignment::admit(Uuid::new_v4(), Uuid::new_v4(), day);
        let discharged = active.discharge(day).unwrap();
        assert_eq!(discharged.status, AssignmentStatus::Discharged);
        assert_eq!(discharged.discharge_date, Some(day));
        assert!(matches!(discharged.discharge(day), Err(StoreError::AssignmentNotActive { .. })));
    }
}
