//! Error handling for the basalt IR library
//!
//! Construction-time validation failures are reported through one typed
//! error enum. Lookup misses are not errors; APIs that can miss return
//! `Option` instead.

use thiserror::Error;

/// Errors produced while constructing or mutating IR.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    /// Operand types violate an opcode's domain rule.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// Wrong operand count or an operand of the wrong kind, e.g. a GEP
    /// index that is not an integer.
    #[error("shape violation: {message}")]
    ShapeViolation { message: String },

    /// An operation attempted in a state that forbids it, e.g. appending
    /// past a terminator or redefining a struct body.
    #[error("state violation: {message}")]
    StateViolation { message: String },

    /// A structural invariant of the value graph no longer holds.
    #[error("internal invariant broken: {message}")]
    InternalInvariant { message: String },
}

impl IrError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        IrError::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn shape_violation(message: impl Into<String>) -> Self {
        IrError::ShapeViolation {
            message: message.into(),
        }
    }

    pub fn state_violation(message: impl Into<String>) -> Self {
        IrError::StateViolation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        IrError::InternalInvariant {
            message: message.into(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for IrError {
    fn from(message: String) -> Self {
        IrError::InternalInvariant { message }
    }
}

/// Result alias used across the IR crates.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IrError::type_mismatch("add operands differ");
        assert_eq!(err.to_string(), "type mismatch: add operands differ");

        let err = IrError::state_violation("block already terminated");
        assert_eq!(err.to_string(), "state violation: block already terminated");
    }

    #[test]
    fn test_from_string() {
        let err: IrError = "use-list desynchronized".to_string().into();
        assert!(matches!(err, IrError::InternalInvariant { .. }));
    }
}
