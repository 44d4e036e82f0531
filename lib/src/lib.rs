// lib/src/lib.rs
// Hospital backend core: configuration, storage engines, identity
// resolution and the request workflows.

pub mod config;
pub mod hospital;
pub mod resolver;
pub mod storage_engine;
pub mod workflows;

pub use crate::config::{load_hospital_config, HospitalConfig, StorageEngineType};
pub use crate::hospital::Hospital;
pub use crate::resolver::{CachedIdentityResolver, IdentityResolver};
pub use crate::storage_engine::{create_storage, HospitalStore, InMemoryStorage, SledStorage};

pub use models::errors::{HospitalError, HospitalResult};
