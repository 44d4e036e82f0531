// models/src/lifecycle.rs

use std::fmt;

use crate::errors::{ValidationError, ValidationResult};

/// A status enum with an explicit transition table.
///
/// Re-asserting the current status is always accepted so that callers can
/// touch other fields (notes, for example) without moving the entity.
pub trait Lifecycle: Copy + PartialEq + fmt::Display {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Whether the table contains an edge from `self` to `next`.
    fn allows(self, next: Self) -> bool;

    fn is_terminal(self) -> bool;

    fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allows(next)
    }

    fn transition(self, next: Self) -> ValidationResult<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ValidationError::IllegalTransition {
                entity: Self::ENTITY,
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}
