use super::course::CourseId;
use super::student::StudentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite identity of a registration.
///
/// Field order matters: ordering by student first lets stores keep a
/// student's registrations contiguous and scan them by range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RegistrationId {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

impl RegistrationId {
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
        }
    }

    /// Big-endian `student_id ++ course_id`, so byte order equals key order.
    pub fn to_key_bytes(&self) -> [u8; 16] {
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&self.student_id.to_be_bytes());
        key[8..].copy_from_slice(&self.course_id.to_be_bytes());
        key
    }

    pub fn from_key_bytes(bytes: &[u8]) -> Option<Self> {
        let student: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
        let course: [u8; 8] = bytes.get(8..16)?.try_into().ok()?;
        Some(Self::new(
            u64::from_be_bytes(student),
            u64::from_be_bytes(course),
        ))
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(student {}, course {})", self.student_id, self.course_id)
    }
}

/// One student's enrollment in one course. Never updated in place: it is
/// created by a registration and removed by an unregistration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    /// Price actually charged, after any discount.
    pub price: u64,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(id: RegistrationId, price: u64, registered_at: DateTime<Utc>) -> Self {
        Self {
            id,
            price,
            registered_at,
        }
    }

    pub fn student_id(&self) -> StudentId {
        self.id.student_id
    }

    pub fn course_id(&self) -> CourseId {
        self.id.course_id
    }
}
