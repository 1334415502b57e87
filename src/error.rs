use crate::domain::registration::RegistrationId;
use crate::domain::student::StudentId;
use std::fmt;
use thiserror::Error;

/// The record kind a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Student,
    Course,
    Registration,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Student => f.write_str("Student"),
            Entity::Course => f.write_str("Course"),
            Entity::Registration => f.write_str("Registration"),
        }
    }
}

/// The engine operation a business rule was checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Unregister,
}

fn verb_phrase(action: &Action) -> &'static str {
    match action {
        Action::Register => "register for",
        Action::Unregister => "unregister from",
    }
}

/// A business rule that rejected the requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("cannot {} a course that has already started", verb_phrase(.0))]
    CourseAlreadyStarted(Action),
    #[error("already registered for this course")]
    AlreadyRegistered,
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("Invalid operation: {0}")]
    InvalidOperation(Violation),
    #[error("Registration {0} already exists in storage")]
    DuplicateKey(RegistrationId),
    #[error("Email {email} already belongs to student {owner}")]
    DuplicateEmail { email: String, owner: StudentId },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl RegistrationError {
    /// Business-rule failures the caller can act on. Everything else is an
    /// unclassified failure of the surrounding infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RegistrationError::NotFound(_) | RegistrationError::InvalidOperation(_)
        )
    }
}

impl From<toml::de::Error> for RegistrationError {
    fn from(err: toml::de::Error) -> Self {
        RegistrationError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_error_messages() {
        assert_eq!(
            RegistrationError::NotFound(Entity::Student).to_string(),
            "Student not found"
        );
        assert_eq!(
            RegistrationError::InvalidOperation(Violation::CourseAlreadyStarted(Action::Register))
                .to_string(),
            "Invalid operation: cannot register for a course that has already started"
        );
        assert_eq!(
            RegistrationError::InvalidOperation(Violation::CourseAlreadyStarted(
                Action::Unregister
            ))
            .to_string(),
            "Invalid operation: cannot unregister from a course that has already started"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RegistrationError::NotFound(Entity::Registration).is_client_error());
        assert!(RegistrationError::InvalidOperation(Violation::AlreadyRegistered).is_client_error());
        assert!(!RegistrationError::DuplicateKey(RegistrationId::new(1, 1)).is_client_error());
        assert!(!RegistrationError::ConfigError("bad".into()).is_client_error());
        assert!(
            !RegistrationError::DuplicateEmail {
                email: "a@x.com".into(),
                owner: 1
            }
            .is_client_error()
        );
    }
}
