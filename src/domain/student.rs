use serde::{Deserialize, Serialize};

pub type StudentId = u64;

/// A student identity record. Created and maintained outside the engine,
/// which only ever looks students up by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn new(
        id: StudentId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}
