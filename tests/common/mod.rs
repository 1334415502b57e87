#![allow(dead_code)]

use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};

pub const FUTURE_START: &str = "2099-01-01T09:00:00Z";
pub const FUTURE_END: &str = "2099-02-01T09:00:00Z";
pub const PAST_START: &str = "2000-01-01T09:00:00Z";
pub const FAR_END: &str = "2199-01-01T09:00:00Z";

/// Writes `students.csv` and `courses.csv` into `dir`.
///
/// Courses 1 and 2 start in the future; course 3 started long ago and is
/// still running.
pub fn write_catalog(dir: &Path) -> Result<(PathBuf, PathBuf), Error> {
    let students = dir.join("students.csv");
    fs::write(
        &students,
        "id,email,first_name,last_name\n\
         1,a@x.com,Ada,Lovelace\n\
         2,b@x.com,Alan,Turing\n",
    )?;

    let courses = dir.join("courses.csv");
    fs::write(
        &courses,
        format!(
            "id,name,start_time,end_time,price\n\
             1,Rust,{FUTURE_START},{FUTURE_END},100000\n\
             2,Tokio,{FUTURE_START},{FUTURE_END},80000\n\
             3,Serde,{PAST_START},{FAR_END},50000\n"
        ),
    )?;

    Ok((students, courses))
}

/// Writes a batch file with the given `action,course_id,email` rows.
pub fn write_commands(dir: &Path, name: &str, rows: &[&str]) -> Result<PathBuf, Error> {
    let path = dir.join(name);
    let mut content = String::from("action,course_id,email\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content)?;
    Ok(path)
}
