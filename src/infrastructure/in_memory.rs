use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{Catalog, RegistrationStore, UnitOfWork, UnitOfWorkBox};
use crate::domain::registration::{Registration, RegistrationId};
use crate::domain::student::{Student, StudentId};
use crate::error::{RegistrationError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
struct Tables {
    students: HashMap<StudentId, Student>,
    student_emails: HashMap<String, StudentId>,
    courses: HashMap<CourseId, Course>,
    registrations: BTreeMap<RegistrationId, Registration>,
}

/// A thread-safe in-memory store for students, courses and registrations.
///
/// All tables sit behind one `Arc<Mutex<_>>`. A unit of work holds the owned
/// guard for its whole lifetime, so units of work are serialized and the
/// read-check-write sequence of an engine operation cannot interleave with
/// another one.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all committed registrations, in key order.
    pub async fn registrations(&self) -> Vec<Registration> {
        let tables = self.tables.lock().await;
        tables.registrations.values().cloned().collect()
    }

    /// Inserts a registration directly, bypassing the engine's rules.
    #[cfg(test)]
    pub(crate) async fn put_registration(&self, registration: Registration) {
        let mut tables = self.tables.lock().await;
        tables.registrations.insert(registration.id, registration);
    }

    /// Removes a course, leaving any registrations that reference it.
    #[cfg(test)]
    pub(crate) async fn remove_course(&self, course_id: CourseId) {
        let mut tables = self.tables.lock().await;
        tables.courses.remove(&course_id);
    }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn upsert_student(&self, student: Student) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(&owner) = tables.student_emails.get(&student.email)
            && owner != student.id
        {
            return Err(RegistrationError::DuplicateEmail {
                email: student.email,
                owner,
            });
        }

        if let Some(previous) = tables.students.get(&student.id)
            && previous.email != student.email
        {
            let stale = previous.email.clone();
            tables.student_emails.remove(&stale);
        }
        tables.student_emails.insert(student.email.clone(), student.id);
        tables.students.insert(student.id, student);
        Ok(())
    }

    async fn upsert_course(&self, course: Course) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.courses.insert(course.id, course);
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn begin(&self) -> Result<UnitOfWorkBox> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            staged: BTreeMap::new(),
        }))
    }
}

/// Pending registration writes layered over the committed table and applied
/// on commit. `None` marks a staged delete.
struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: BTreeMap<RegistrationId, Option<Registration>>,
}

fn student_range(student_id: StudentId) -> RangeInclusive<RegistrationId> {
    RegistrationId::new(student_id, CourseId::MIN)..=RegistrationId::new(student_id, CourseId::MAX)
}

impl InMemoryUnitOfWork {
    fn registration(&self, id: RegistrationId) -> Option<&Registration> {
        match self.staged.get(&id) {
            Some(staged) => staged.as_ref(),
            None => self.guard.registrations.get(&id),
        }
    }

    /// The student's registrations with their resolvable courses, in course
    /// id order.
    fn student_courses(&self, student_id: StudentId) -> Vec<(&Registration, &Course)> {
        let mut merged: BTreeMap<RegistrationId, &Registration> = self
            .guard
            .registrations
            .range(student_range(student_id))
            .map(|(id, registration)| (*id, registration))
            .collect();
        for (id, staged) in self.staged.range(student_range(student_id)) {
            match staged {
                Some(registration) => merged.insert(*id, registration),
                None => merged.remove(id),
            };
        }

        merged
            .into_values()
            .filter_map(|registration| {
                self.guard
                    .courses
                    .get(&registration.course_id())
                    .map(|course| (registration, course))
            })
            .collect()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>> {
        Ok(self
            .guard
            .student_emails
            .get(email)
            .and_then(|id| self.guard.students.get(id))
            .cloned())
    }

    async fn find_course_by_id(&mut self, course_id: CourseId) -> Result<Option<Course>> {
        Ok(self.guard.courses.get(&course_id).cloned())
    }

    async fn find_registration(&mut self, id: RegistrationId) -> Result<Option<Registration>> {
        Ok(self.registration(id).cloned())
    }

    async fn find_upcoming_registrations_by_student(
        &mut self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Registration>> {
        Ok(self
            .student_courses(student_id)
            .into_iter()
            .filter(|(_, course)| course.is_upcoming(now))
            .map(|(registration, _)| registration.clone())
            .collect())
    }

    async fn count_ongoing_registrations_by_student(
        &mut self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        Ok(self
            .student_courses(student_id)
            .into_iter()
            .filter(|(_, course)| course.is_ongoing(now))
            .count())
    }

    async fn save_registration(&mut self, registration: Registration) -> Result<()> {
        if self.registration(registration.id).is_some() {
            return Err(RegistrationError::DuplicateKey(registration.id));
        }
        self.staged.insert(registration.id, Some(registration));
        Ok(())
    }

    async fn delete_registration(&mut self, id: RegistrationId) -> Result<()> {
        self.staged.insert(id, None);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, staged } = *self;
        for (id, staged) in staged {
            match staged {
                Some(registration) => guard.registrations.insert(id, registration),
                None => guard.registrations.remove(&id),
            };
        }
        Ok(())
    }
}
