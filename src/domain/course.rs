use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CourseId = u64;

/// A scheduled course offering.
///
/// `price` is expressed in the smallest currency unit. The time predicates
/// take `now` explicitly so a single operation evaluates every rule against
/// the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: u64,
}

impl Course {
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        price: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_time,
            end_time,
            price,
        }
    }

    /// True once `now` has reached the start time.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    /// Started but not yet ended.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Starts strictly after `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}
