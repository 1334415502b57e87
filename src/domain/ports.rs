use super::course::{Course, CourseId};
use super::registration::{Registration, RegistrationId};
use super::student::{Student, StudentId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage the registration engine runs against.
///
/// Every engine operation happens inside one unit of work. Stores must
/// serialize units of work that touch the same registration key and must
/// reject a second registration for an existing key.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn begin(&self) -> Result<UnitOfWorkBox>;
}

/// A single atomic storage transaction.
///
/// Reads observe the unit's own staged writes. Nothing becomes visible to
/// other units until [`UnitOfWork::commit`]; dropping the unit without
/// committing discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>>;

    async fn find_course_by_id(&mut self, course_id: CourseId) -> Result<Option<Course>>;

    async fn find_registration(&mut self, id: RegistrationId) -> Result<Option<Registration>>;

    /// Registrations of `student_id` whose course starts strictly after `now`.
    async fn find_upcoming_registrations_by_student(
        &mut self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Registration>>;

    /// Registrations of `student_id` whose course satisfies
    /// `start_time <= now < end_time`.
    async fn count_ongoing_registrations_by_student(
        &mut self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// Fails with `DuplicateKey` if the key is already taken.
    async fn save_registration(&mut self, registration: Registration) -> Result<()>;

    async fn delete_registration(&mut self, id: RegistrationId) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Write access to students and courses for whatever owns the catalog.
/// The engine never uses it.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn upsert_student(&self, student: Student) -> Result<()>;
    async fn upsert_course(&self, course: Course) -> Result<()>;
}

pub type RegistrationStoreBox = Box<dyn RegistrationStore>;
pub type UnitOfWorkBox = Box<dyn UnitOfWork>;
pub type CatalogBox = Box<dyn Catalog>;
