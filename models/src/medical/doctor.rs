use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::{UserName, UserSummary};

pub const DEFAULT_SPECIALIZATION: &str = "General Medicine";
pub const DEFAULT_DEPARTMENT: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: String,
    pub specialization: String,
    pub license_number: String,
    pub department: String,
    pub experience_years: u32,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// Builds a doctor record, filling the defaults used at sign-up.
    pub fn new(
        user_id: &str,
        specialization: Option<String>,
        license_number: Option<String>,
        department: Option<String>,
        experience_years: Option<u32>,
    ) -> Self {
        let now = Utc::now();
        Doctor {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            specialization: specialization.unwrap_or_else(|| DEFAULT_SPECIALIZATION.to_string()),
            license_number: license_number
                .unwrap_or_else(|| format!("LIC{}", now.timestamp_millis())),
            department: department.unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
            experience_years: experience_years.unwrap_or(0),
            created_at: now,
        }
    }
}

/// Doctor as nested inside an appointment listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorDetail {
    pub id: Uuid,
    pub specialization: String,
    pub license_number: String,
    pub department: String,
    pub user: Option<DoctorUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

/// Doctor directory entry (`GET /doctors`), inner-joined with its user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorListing {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: DoctorContact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorContact {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Doctor as nested inside prescription and bill listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorName {
    pub user: Option<UserName>,
}

impl From<&UserSummary> for DoctorUser {
    fn from(user: &UserSummary) -> Self {
        DoctorUser {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}
