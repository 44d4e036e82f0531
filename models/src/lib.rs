// models/src/lib.rs
// Shared record types for the hospital workspace: entities, their status
// lifecycles, request payloads and the error taxonomy.

pub mod errors;
pub mod inputs;
pub mod lifecycle;
pub mod medical;

pub use errors::{HospitalError, HospitalResult, StoreError, StoreResult, ValidationError};
pub use lifecycle::Lifecycle;
pub use medical::Role;
