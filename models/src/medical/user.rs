// models/src/medical/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::inputs::{optional_count, optional_text, required_text, NumericInput};
use crate::medical::{Doctor, Patient, Role};

// --- DTO for profile registration ---
// Identity itself (passwords, sessions) lives with the external provider;
// the `id` it issued is passed through when known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub age: Option<NumericInput>,
    // doctor profile
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub department: Option<String>,
    pub experience_years: Option<NumericInput>,
    // patient profile
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

// --- Stored User Struct ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Validates the common profile fields of a registration payload.
    pub fn from_new_user(new_user: &NewUser) -> ValidationResult<Self> {
        let email = required_text(&new_user.email, "email")?;
        if !email.contains('@') {
            return Err(ValidationError::invalid("email", "not an email address"));
        }
        let role = required_text(&new_user.role, "role")?.parse::<Role>()?;
        let now = Utc::now();

        Ok(User {
            id: optional_text(&new_user.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            email: email.to_lowercase(),
            full_name: required_text(&new_user.full_name, "full_name")?,
            role,
            phone: optional_text(&new_user.phone),
            age: optional_count(&new_user.age, "age")?,
            created_at: now,
            updated_at: now,
        })
    }
}

/// The role-specific record created alongside a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleProfile {
    Patient(Patient),
    Doctor(Doctor),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Patient(_) => Role::Patient,
            RoleProfile::Doctor(_) => Role::Doctor,
        }
    }

    pub fn record_id(&self) -> Uuid {
        match self {
            RoleProfile::Patient(patient) => patient.id,
            RoleProfile::Doctor(doctor) => doctor.id,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            RoleProfile::Patient(patient) => &patient.user_id,
            RoleProfile::Doctor(doctor) => &doctor.user_id,
        }
    }
}

/// Result of a registration: `{"user": {...}, "patient": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub user: User,
    #[serde(flatten)]
    pub profile: RoleProfile,
}

/// The slice of a user that nested views expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: Option<u32>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            age: user.age,
        }
    }
}

/// Just the display name, for joins that only need that much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserName {
    pub full_name: String,
}

impl From<&User> for UserName {
    fn from(user: &User) -> Self {
        UserName { full_name: user.full_name.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_an_id_when_the_provider_gave_none() {
        let user = User::from_new_user(&NewUser {
            email: Some("Ada@Example.com".into()),
            full_name: Some("Ada Lovelace".into()),
            role: Some("patient".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(Uuid::parse_str(&user.id).is_ok());
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Patient);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = User::from_new_user(&NewUser {
            email: Some("x@example.com".into()),
            full_name: Some("X".into()),
            role: Some("nurse".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "role", .. }));
    }
}
