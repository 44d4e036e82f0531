// lib/src/workflows/mod.rs
// Request-level operations. Each workflow validates its payload, resolves
// external user ids through the `IdentityResolver`, and talks to the store.

pub mod appointment;
pub mod billing;
pub mod inventory;
pub mod joins;
pub mod prescription;
pub mod registration;
pub mod room;

pub use appointment::AppointmentWorkflow;
pub use billing::BillingWorkflow;
pub use inventory::InventoryWorkflow;
pub use joins::RecordJoiner;
pub use prescription::PrescriptionWorkflow;
pub use registration::RegistrationWorkflow;
pub use room::RoomWorkflow;

use models::errors::{HospitalError, HospitalResult};
use models::medical::Role;
use uuid::Uuid;

use crate::resolver::IdentityResolver;

/// Resolves a user id that a write depends on; absence is a `NotFound`.
pub(crate) async fn require_record(
    resolver: &dyn IdentityResolver,
    role: Role,
    user_id: &str,
) -> HospitalResult<Uuid> {
    resolver
        .resolve(role, user_id)
        .await?
        .ok_or_else(|| HospitalError::not_found(format!("{} not found for user {}", role, user_id)))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use models::inputs::NumericInput;
    use models::medical::NewUser;

    use crate::config::ResolverConfig;
    use crate::resolver::{CachedIdentityResolver, IdentityResolver};
    use crate::storage_engine::{HospitalStore, InMemoryStorage};

    use super::RegistrationWorkflow;

    pub struct Fixture {
        pub store: Arc<dyn HospitalStore>,
        pub resolver: Arc<dyn IdentityResolver>,
    }

    impl Fixture {
        pub fn new() -> Self {
            let store: Arc<dyn HospitalStore> = Arc::new(InMemoryStorage::new());
            let resolver: Arc<dyn IdentityResolver> =
                Arc::new(CachedIdentityResolver::new(store.clone(), &ResolverConfig::default()));
            Fixture { store, resolver }
        }

        pub fn registration(&self) -> RegistrationWorkflow {
            RegistrationWorkflow::new(self.store.clone(), self.resolver.clone())
        }

        pub async fn patient(&self, user_id: &str, full_name: &str) {
            self.registration()
                .register(&NewUser {
                    id: Some(user_id.to_string()),
                    email: Some(format!("{}@example.com", user_id)),
                    full_name: Some(full_name.to_string()),
                    role: Some("patient".to_string()),
                    phone: Some("555-0101".to_string()),
                    age: Some(NumericInput::from(34.0)),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        pub async fn doctor(&self, user_id: &str, full_name: &str) {
            self.registration()
                .register(&NewUser {
                    id: Some(user_id.to_string()),
                    email: Some(format!("{}@example.com", user_id)),
                    full_name: Some(full_name.to_string()),
                    role: Some("doctor".to_string()),
                    specialization: Some("Cardiology".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
    }
}
