use super::command_reader::CommandKind;
use crate::domain::course::CourseId;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Ok,
    Rejected,
}

/// Result of one batch command, written as
/// `action,course_id,email,result,detail`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Outcome {
    pub action: CommandKind,
    pub course_id: CourseId,
    pub email: String,
    pub result: OutcomeKind,
    pub detail: String,
}

/// Writes batch outcomes as CSV to any `Write` sink.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, outcome: &Outcome) -> Result<()> {
        self.writer.serialize(outcome)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_emits_header_once() {
        let mut buf = Vec::new();
        {
            let mut writer = OutcomeWriter::new(&mut buf);
            for course_id in [1, 2] {
                writer
                    .write(&Outcome {
                        action: CommandKind::Register,
                        course_id,
                        email: "a@x.com".into(),
                        result: OutcomeKind::Ok,
                        detail: course_id.to_string(),
                    })
                    .unwrap();
            }
            writer.flush().unwrap();
        }

        let output = String::from_utf8(buf).unwrap();
        assert_eq!(
            output,
            "action,course_id,email,result,detail\n\
             register,1,a@x.com,ok,1\n\
             register,2,a@x.com,ok,2\n"
        );
    }
}
