use crate::domain::clock::{ClockBox, SystemClock};
use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{RegistrationStoreBox, UnitOfWork};
use crate::domain::pricing;
use crate::domain::registration::{Registration, RegistrationId};
use crate::domain::student::StudentId;
use crate::error::{Action, Entity, RegistrationError, Result, Violation};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// The registration business-rule engine.
///
/// Each operation reads the clock once and runs inside a single unit of work
/// from the store. Any early return drops the unit of work uncommitted, which
/// rolls back whatever it staged.
pub struct RegistrationEngine {
    store: RegistrationStoreBox,
    clock: ClockBox,
}

impl RegistrationEngine {
    /// Creates a new `RegistrationEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - Storage for students, courses and registrations.
    /// * `clock` - Source of the current instant for time-gated rules.
    pub fn new(store: RegistrationStoreBox, clock: ClockBox) -> Self {
        Self { store, clock }
    }

    /// Creates an engine that evaluates rules against wall-clock time.
    pub fn with_system_clock(store: RegistrationStoreBox) -> Self {
        Self::new(store, Box::new(SystemClock))
    }

    /// Registers the student with `email` for `course_id` and returns the
    /// student's upcoming registered courses, new one included.
    ///
    /// The price charged is discounted when the student already has
    /// [`pricing::DISCOUNT_THRESHOLD`] or more courses in progress.
    pub async fn register(&self, email: &str, course_id: CourseId) -> Result<Vec<Course>> {
        let now = self.clock.now();
        let mut uow = self.store.begin().await?;

        let student = uow
            .find_student_by_email(email)
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Student))?;
        let course = uow
            .find_course_by_id(course_id)
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Course))?;

        if course.has_started(now) {
            return Err(RegistrationError::InvalidOperation(
                Violation::CourseAlreadyStarted(Action::Register),
            ));
        }

        let id = RegistrationId::new(student.id, course.id);
        if uow.find_registration(id).await?.is_some() {
            return Err(RegistrationError::InvalidOperation(
                Violation::AlreadyRegistered,
            ));
        }

        let ongoing = uow
            .count_ongoing_registrations_by_student(student.id, now)
            .await?;
        let price = pricing::final_price(course.price, ongoing);
        debug!(
            student = student.id,
            course = course.id,
            ongoing,
            list_price = course.price,
            price,
            "Priced registration"
        );

        uow.save_registration(Registration::new(id, price, now))
            .await?;
        let upcoming = upcoming_registered_courses(uow.as_mut(), student.id, now).await?;
        uow.commit().await?;

        info!(student = student.id, course = course.id, price, "Registered");
        Ok(upcoming)
    }

    /// Cancels the student's registration for `course_id`. Only allowed
    /// before the course starts.
    pub async fn unregister(&self, course_id: CourseId, email: &str) -> Result<bool> {
        let now = self.clock.now();
        let mut uow = self.store.begin().await?;

        let student = uow
            .find_student_by_email(email)
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Student))?;
        let course = uow
            .find_course_by_id(course_id)
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Course))?;

        if course.has_started(now) {
            return Err(RegistrationError::InvalidOperation(
                Violation::CourseAlreadyStarted(Action::Unregister),
            ));
        }

        let registration = uow
            .find_registration(RegistrationId::new(student.id, course.id))
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Registration))?;

        uow.delete_registration(registration.id).await?;
        uow.commit().await?;

        info!(student = student.id, course = course.id, "Unregistered");
        Ok(true)
    }
}

/// Courses behind the student's registrations that start after `now`, in the
/// order the store returns the registrations. Registrations whose course no
/// longer resolves are skipped.
async fn upcoming_registered_courses(
    uow: &mut dyn UnitOfWork,
    student_id: StudentId,
    now: DateTime<Utc>,
) -> Result<Vec<Course>> {
    let registrations = uow
        .find_upcoming_registrations_by_student(student_id, now)
        .await?;

    let mut courses = Vec::with_capacity(registrations.len());
    for registration in registrations {
        match uow.find_course_by_id(registration.course_id()).await? {
            Some(course) => courses.push(course),
            None => warn!(
                student = student_id,
                course = registration.course_id(),
                "Skipping registration for unknown course"
            ),
        }
    }
    Ok(courses)
}
