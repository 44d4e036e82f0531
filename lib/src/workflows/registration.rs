// lib/src/workflows/registration.rs

use std::sync::Arc;
use tracing::info;

use models::errors::{HospitalError, HospitalResult};
use models::inputs::{optional_count, optional_text};
use models::medical::{
    Doctor, DoctorContact, DoctorListing, NewUser, Patient, Registration, Role, RoleProfile, User,
};

use crate::resolver::IdentityResolver;
use crate::storage_engine::HospitalStore;

/// Profile creation for users issued by the identity provider.
pub struct RegistrationWorkflow {
    store: Arc<dyn HospitalStore>,
    resolver: Arc<dyn IdentityResolver>,
}

impl RegistrationWorkflow {
    pub fn new(store: Arc<dyn HospitalStore>, resolver: Arc<dyn IdentityResolver>) -> Self {
        RegistrationWorkflow { store, resolver }
    }

    /// Creates the user and its patient or doctor record together.
    pub async fn register(&self, new_user: &NewUser) -> HospitalResult<Registration> {
        let user = User::from_new_user(new_user)?;
        let profile = match user.role {
            Role::Patient => {
                let emergency_contact = optional_text(&new_user.emergency_contact)
                    .or_else(|| user.phone.clone());
                RoleProfile::Patient(Patient::new(
                    &user.id,
                    optional_text(&new_user.blood_group),
                    emergency_contact,
                ))
            }
            Role::Doctor => RoleProfile::Doctor(Doctor::new(
                &user.id,
                optional_text(&new_user.specialization),
                optional_text(&new_user.license_number),
                optional_text(&new_user.department),
                optional_count(&new_user.experience_years, "experience_years")?,
            )),
        };

        self.store.register_user(&user, &profile).await?;
        self.resolver.remember(profile.role(), &user.id, profile.record_id()).await;
        info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(Registration { user, profile })
    }

    /// Doctors that have a user profile, ordered by name.
    pub async fn list_doctors(&self) -> HospitalResult<Vec<DoctorListing>> {
        let mut listings = Vec::new();
        for doctor in self.store.list_doctors().await? {
            if let Some(user) = self.store.get_user(&doctor.user_id).await? {
                listings.push(DoctorListing {
                    doctor,
                    user: DoctorContact {
                        full_name: user.full_name,
                        email: user.email,
                        phone: user.phone,
                    },
                });
            }
        }
        listings.sort_by(|a, b| a.user.full_name.cmp(&b.user.full_name));
        Ok(listings)
    }

    pub async fn get_user(&self, id: &str) -> HospitalResult<User> {
        self.store
            .get_user(id.trim())
            .await?
            .ok_or_else(|| HospitalError::not_found(format!("user {} not found", id)))
    }
}
