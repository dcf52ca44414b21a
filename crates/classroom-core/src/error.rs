//! Error types for the Classroom application.

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Why an access-controlled operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The caller does not hold the OWNER role on the session.
    #[strum(serialize = "caller is not the session owner")]
    NotOwner,
    /// The session is private and the caller holds no membership.
    #[strum(serialize = "not invited to this session")]
    NotInvited,
    /// The caller has not joined the session.
    #[strum(serialize = "caller is not a member of this session")]
    NotMember,
}

/// A shared error type for the entire Classroom application.
///
/// Every variant is a recoverable outcome handed back to the caller;
/// nothing here is meant to abort the process.
#[derive(Error, Debug, Clone, Serialize)]
pub enum ClassroomError {
    /// Caller lacks the role or ownership the operation requires
    #[error("Forbidden: {reason}")]
    Forbidden { reason: ForbiddenReason },

    /// Referenced session does not exist
    #[error("Session doesn't exist: '{0}'")]
    UnknownSession(String),

    /// Referenced user does not exist
    #[error("User doesn't exist: '{0}'")]
    UnknownUser(String),

    /// A required input field is absent or blank
    #[error("Missing {0} field")]
    MissingField(String),

    /// An input field carries a value outside its domain
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },

    /// A session has no OWNER membership (data corruption)
    #[error("Owner not found for session '{0}'")]
    OwnerNotFound(String),

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClassroomError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn forbidden(reason: ForbiddenReason) -> Self {
        Self::Forbidden { reason }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns the refusal reason for Forbidden errors.
    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            Self::Forbidden { reason } => Some(*reason),
            _ => None,
        }
    }

    /// Check if a referenced session or user is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownSession(_) | Self::UnknownUser(_))
    }

    /// Check if this error reports malformed input
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidValue { .. })
    }

    /// Check if this error signals corrupted membership data
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::OwnerNotFound(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ClassroomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ClassroomError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ClassroomError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ClassroomError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ClassroomError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ClassroomError>`.
pub type Result<T> = std::result::Result<T, ClassroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message_names_reason() {
        let err = ClassroomError::forbidden(ForbiddenReason::NotInvited);
        assert_eq!(err.to_string(), "Forbidden: not invited to this session");
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotInvited));
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_type_checks() {
        assert!(ClassroomError::UnknownUser("bob".into()).is_not_found());
        assert!(ClassroomError::UnknownSession("s1".into()).is_not_found());
        assert!(ClassroomError::missing_field("role").is_bad_input());
        assert!(ClassroomError::invalid_value("role", "admin").is_bad_input());
        assert!(ClassroomError::OwnerNotFound("s1".into()).is_integrity_violation());
        assert!(!ClassroomError::OwnerNotFound("s1".into()).is_forbidden());
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ClassroomError = io.into();
        assert!(err.to_string().contains("NotFound"));
    }
}
