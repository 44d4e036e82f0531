// models/src/errors.rs

pub use thiserror::Error;

/// A field-level validation failure. These are always the caller's fault.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// A required field was absent, null or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// A field was present but could not be accepted.
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    /// A status change that the entity's lifecycle does not allow.
    #[error("illegal {entity} status transition from {from} to {to}")]
    IllegalTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField { field, reason: reason.into() }
    }
}

/// Errors raised by a storage engine. The messages may mention tables and
/// columns, so they are only ever logged, never sent to clients.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("insert or update on {table} violates foreign key {column}={value}")]
    ForeignKeyViolation {
        table: &'static str,
        column: &'static str,
        value: String,
    },
    #[error("duplicate key value violates unique constraint {table}.{column}={value}")]
    UniqueViolation {
        table: &'static str,
        column: &'static str,
        value: String,
    },
    #[error("no row in {table} with id {id}")]
    RowNotFound { table: &'static str, id: String },
    #[error("room {room_id} is {status}, not available")]
    RoomUnavailable { room_id: String, status: String },
    #[error("room assignment {assignment_id} is not active")]
    AssignmentNotActive { assignment_id: String },
    #[error("medicine {medicine_id} has {available} units in stock")]
    InsufficientStock { medicine_id: String, available: u32 },
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("record codec error: {0}")]
    Codec(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum HospitalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(StoreError),
    #[error("an internal error occurred: {0}")]
    Unexpected(String),
}

impl From<StoreError> for HospitalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RowNotFound { table, id } => {
                HospitalError::NotFound(format!("{} record {} not found", singular(table), id))
            }
            StoreError::RoomUnavailable { .. } => {
                HospitalError::Conflict("room is not available for assignment".to_string())
            }
            StoreError::AssignmentNotActive { .. } => {
                HospitalError::Conflict("room assignment is not active".to_string())
            }
            StoreError::InsufficientStock { available, .. } => HospitalError::Conflict(format!(
                "insufficient stock: {} units available",
                available
            )),
            other => HospitalError::Store(other),
        }
    }
}

fn singular(table: &str) -> &str {
    match table {
        "appointments" => "appointment",
        "medicines" => "medicine",
        "rooms" => "room",
        "room_assignments" => "room assignment",
        "billing" => "bill",
        "users" => "user",
        other => other,
    }
}

impl HospitalError {
    /// Closed set of codes handed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            HospitalError::Validation(_) => "validation_error",
            HospitalError::NotFound(_) => "not_found",
            HospitalError::Conflict(_) => "conflict",
            HospitalError::Store(_) => "store_error",
            HospitalError::Unexpected(_) => "internal_error",
        }
    }

    /// Message that is safe to show a client. Store and unexpected errors
    /// collapse to fixed text; the detail belongs in the server log.
    pub fn client_message(&self) -> String {
        match self {
            HospitalError::Validation(e) => e.to_string(),
            HospitalError::NotFound(msg) | HospitalError::Conflict(msg) => msg.clone(),
            HospitalError::Store(StoreError::UniqueViolation { column, .. }) => {
                format!("a record with this {} already exists", column)
            }
            HospitalError::Store(StoreError::ForeignKeyViolation { column, .. }) => {
                format!("referenced record for {} does not exist", column)
            }
            HospitalError::Store(_) => "the storage layer rejected the operation".to_string(),
            HospitalError::Unexpected(_) => "Internal server error".to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        HospitalError::NotFound(what.into())
    }
}

/// A type alias for a `Result` that returns a `HospitalError` on failure.
pub type HospitalResult<T> = Result<T, HospitalError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_messages_are_not_leaked() {
        let err: HospitalError = StoreError::Backend("tree 'billing' is corrupt at offset 12".into()).into();
        assert_eq!(err.code(), "store_error");
        assert!(!err.client_message().contains("billing"));
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: HospitalError = StoreError::RowNotFound { table: "billing", id: "42".into() }.into();
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.client_message(), "bill record 42 not found");
    }

    #[test]
    fn room_unavailable_is_a_conflict() {
        let err: HospitalError = StoreError::RoomUnavailable {
            room_id: "r1".into(),
            status: "occupied".into(),
        }
        .into();
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn validation_message_names_the_field() {
        let err: HospitalError = ValidationError::MissingField("appointment_date").into();
        assert_eq!(err.client_message(), "missing required field: appointment_date");
    }
}
