// models/src/medical/mod.rs

pub mod appointment;
pub mod billing;
pub mod doctor;
pub mod medicine;
pub mod patient;
pub mod prescription;
pub mod role;
pub mod room;
pub mod user;

pub use appointment::*;
pub use billing::*;
pub use doctor::*;
pub use medicine::*;
pub use patient::*;
pub use prescription::*;
pub use role::Role;
pub use room::*;
pub use user::*;
