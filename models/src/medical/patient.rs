use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::{UserName, UserSummary};

pub const DEFAULT_BLOOD_GROUP: &str = "O+";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: String, // Links to the owning User, 1:1
    pub blood_group: String,
    pub emergency_contact: String,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(user_id: &str, blood_group: Option<String>, emergency_contact: Option<String>) -> Self {
        Patient {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            blood_group: blood_group.unwrap_or_else(|| DEFAULT_BLOOD_GROUP.to_string()),
            emergency_contact: emergency_contact.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }
}

/// Patient as nested inside an appointment listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    pub id: Uuid,
    pub blood_group: String,
    pub emergency_contact: String,
    pub user: Option<UserSummary>,
}

/// Patient as nested inside a bill listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientName {
    pub user: UserName,
}
