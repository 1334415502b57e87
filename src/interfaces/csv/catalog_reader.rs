use crate::domain::course::Course;
use crate::domain::ports::Catalog;
use crate::domain::student::Student;
use crate::error::{RegistrationError, Result};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Reads catalog records (students or courses) from a CSV source.
///
/// Students use the header `id,email,first_name,last_name`; courses use
/// `id,name,start_time,end_time,price` with RFC 3339 timestamps.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes the rows as students.
    pub fn students(self) -> impl Iterator<Item = Result<Student>> {
        self.records()
    }

    /// Lazily deserializes the rows as courses.
    pub fn courses(self) -> impl Iterator<Item = Result<Course>> {
        self.records()
    }

    fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RegistrationError::from))
    }
}

/// Upserts every student row into `catalog`, stopping at the first bad row.
/// Returns the number of rows loaded.
pub async fn load_students<R: Read>(source: R, catalog: &dyn Catalog) -> Result<usize> {
    let mut loaded = 0;
    for student in CatalogReader::new(source).students() {
        catalog.upsert_student(student?).await?;
        loaded += 1;
    }
    tracing::info!(loaded, "Loaded students");
    Ok(loaded)
}

/// Upserts every course row into `catalog`, stopping at the first bad row.
/// Returns the number of rows loaded.
pub async fn load_courses<R: Read>(source: R, catalog: &dyn Catalog) -> Result<usize> {
    let mut loaded = 0;
    for course in CatalogReader::new(source).courses() {
        catalog.upsert_course(course?).await?;
        loaded += 1;
    }
    tracing::info!(loaded, "Loaded courses");
    Ok(loaded)
}
