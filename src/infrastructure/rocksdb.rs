use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{Catalog, RegistrationStore, UnitOfWork, UnitOfWorkBox};
use crate::domain::registration::{Registration, RegistrationId};
use crate::domain::student::{Student, StudentId};
use crate::error::{RegistrationError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Column Family for student records, keyed by id.
pub const CF_STUDENTS: &str = "students";
/// Column Family indexing student ids by email.
pub const CF_STUDENT_EMAILS: &str = "student_emails";
/// Column Family for course records, keyed by id.
pub const CF_COURSES: &str = "courses";
/// Column Family for registrations, keyed by `student_id ++ course_id`.
pub const CF_REGISTRATIONS: &str = "registrations";

/// A persistent store implementation using RocksDB.
///
/// Registration writes are serialized through a store-wide writer lock held
/// by each unit of work, and committed as a single `WriteBatch` so a unit of
/// work is applied entirely or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_STUDENTS, CF_STUDENT_EMAILS, CF_COURSES, CF_REGISTRATIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name).ok_or_else(|| {
        RegistrationError::InternalError(Box::new(std::io::Error::other(format!(
            "{} column family not found",
            name
        ))))
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

fn get<T: DeserializeOwned>(db: &DB, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
    let handle = cf(db, cf_name)?;
    match db.get_pinned_cf(handle, key)? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn decode_student_id(bytes: &[u8]) -> Result<StudentId> {
    let bytes: [u8; 8] = bytes.try_into().map_err(|_| {
        RegistrationError::InternalError(Box::new(std::io::Error::other(
            "malformed student id in email index",
        )))
    })?;
    Ok(StudentId::from_be_bytes(bytes))
}

#[async_trait]
impl Catalog for RocksDBStore {
    async fn upsert_student(&self, student: Student) -> Result<()> {
        let _writer = self.writer.lock().await;
        let students = cf(&self.db, CF_STUDENTS)?;
        let emails = cf(&self.db, CF_STUDENT_EMAILS)?;
        let key = student.id.to_be_bytes();

        if let Some(owner) = self.db.get_pinned_cf(emails, student.email.as_bytes())?
            && owner.as_ref() != key.as_slice()
        {
            return Err(RegistrationError::DuplicateEmail {
                email: student.email,
                owner: decode_student_id(&owner)?,
            });
        }

        let mut batch = WriteBatch::default();
        // Drop the index entry of a previous email, if it still points here.
        if let Some(previous) = get::<Student>(&self.db, CF_STUDENTS, &key)?
            && previous.email != student.email
            && self
                .db
                .get_pinned_cf(emails, previous.email.as_bytes())?
                .is_some_and(|owner| owner.as_ref() == key.as_slice())
        {
            batch.delete_cf(emails, previous.email.as_bytes());
        }
        batch.put_cf(emails, student.email.as_bytes(), key);
        batch.put_cf(students, key, encode(&student)?);
        self.db.write(batch)?;

        Ok(())
    }

    async fn upsert_course(&self, course: Course) -> Result<()> {
        let _writer = self.writer.lock().await;
        let courses = cf(&self.db, CF_COURSES)?;
        self.db
            .put_cf(courses, course.id.to_be_bytes(), encode(&course)?)?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for RocksDBStore {
    async fn begin(&self) -> Result<UnitOfWorkBox> {
        let guard = self.writer.clone().lock_owned().await;
        Ok(Box::new(RocksDBUnitOfWork {
            db: self.db.clone(),
            _writer: guard,
            staged: BTreeMap::new(),
        }))
    }
}

/// Pending registration writes layered over the committed data.
/// `None` marks a staged delete.
struct RocksDBUnitOfWork {
    db: Arc<DB>,
    _writer: OwnedMutexGuard<()>,
    staged: BTreeMap<RegistrationId, Option<Registration>>,
}

impl RocksDBUnitOfWork {
    fn registration(&self, id: RegistrationId) -> Result<Option<Registration>> {
        match self.staged.get(&id) {
            Some(staged) => Ok(staged.clone()),
            None => get(&self.db, CF_REGISTRATIONS, &id.to_key_bytes()),
        }
    }

    fn course(&self, course_id: CourseId) -> Result<Option<Course>> {
        get(&self.db, CF_COURSES, &course_id.to_be_bytes())
    }

    /// All of a student's registrations with their resolvable courses, in
    /// course id order.
    fn student_courses(&self, student_id: StudentId) -> Result<Vec<(Registration, Course)>> {
        let handle = cf(&self.db, CF_REGISTRATIONS)?;
        let prefix = student_id.to_be_bytes();

        let mut registrations = BTreeMap::new();
        let iter = self
            .db
            .iterator_cf(handle, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let registration: Registration = decode(&value)?;
            registrations.insert(registration.id, registration);
        }

        let range = RegistrationId::new(student_id, CourseId::MIN)
            ..=RegistrationId::new(student_id, CourseId::MAX);
        for (id, staged) in self.staged.range(range) {
            match staged {
                Some(registration) => registrations.insert(*id, registration.clone()),
                None => registrations.remove(id),
            };
        }

        let mut joined = Vec::with_capacity(registrations.len());
        for registration in registrations.into_values() {
            if let Some(course) = self.course(registration.course_id())? {
                joined.push((registration, course));
            }
        }
        Ok(joined)
    }
}

#[async_trait]
impl UnitOfWork for RocksDBUnitOfWork {
    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>> {
        let emails = cf(&self.db, CF_STUDENT_EMAILS)?;
        let Some(id) = self.db.get_pinned_cf(emails, email.as_bytes())? else {
            return Ok(None);
        };
        get(&self.db, CF_STUDENTS, &id)
    }

    async fn find_course_by_id(&mut self, course_id: CourseId) -> Result<Option<Course>> {
        self.course(course_id)
    }

    async fn find_registration(&mut self, id: RegistrationId) -> Result<Option<Registration>> {
        self.registration(id)
    }

    async fn find_upcoming_registrations_by_student(
        &mut self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Registration>> {
        Ok(self
            .student_courses(student_id)?
            .into_iter()
            .filter(|(_, course)| course.is_upcoming(now))
            .map(|(registration, _)| registration)
            .collect())
    }

    async fn count_ongoing_registrations_by_student(
        &mut self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        Ok(self
            .student_courses(student_id)?
            .iter()
            .filter(|(_, course)| course.is_ongoing(now))
            .count())
    }

    async fn save_registration(&mut self, registration: Registration) -> Result<()> {
        if self.registration(registration.id)?.is_some() {
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
        let handle = cf(&self.db, CF_REGISTRATIONS)?;
        let mut batch = WriteBatch::default();
        for (id, staged) in &self.staged {
            match staged {
                Some(registration) => {
                    batch.put_cf(handle, id.to_key_bytes(), encode(registration)?)
                }
                None => batch.delete_cf(handle, id.to_key_bytes()),
            }
        }
        self.db.write(batch)?;
        Ok(())
    }
}
