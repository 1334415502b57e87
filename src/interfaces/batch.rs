//! Batch driver: replays a CSV file of register/unregister commands through
//! the engine and writes one outcome row per command.

use super::csv::command_reader::{Command, CommandKind, CommandReader};
use super::csv::outcome_writer::{Outcome, OutcomeKind, OutcomeWriter};
use super::http::UNREGISTERED_MESSAGE;
use crate::application::engine::RegistrationEngine;
use crate::error::Result;
use std::io::{Read, Write};

/// Processes every command in `source`, in order.
///
/// Malformed rows are reported on stderr and skipped. Business-rule
/// rejections are written as `rejected` outcomes. Any other failure stops
/// the run and is returned.
pub async fn run_batch<R: Read, W: Write>(
    engine: &RegistrationEngine,
    source: R,
    sink: W,
) -> Result<()> {
    let mut writer = OutcomeWriter::new(sink);
    for command in CommandReader::new(source).commands() {
        match command {
            Ok(command) => {
                let outcome = execute(engine, command).await?;
                writer.write(&outcome)?;
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }
    writer.flush()
}

async fn execute(engine: &RegistrationEngine, command: Command) -> Result<Outcome> {
    let result = match command.action {
        CommandKind::Register => engine
            .register(&command.email, command.course_id)
            .await
            .map(|courses| {
                courses
                    .iter()
                    .map(|course| course.id.to_string())
                    .collect::<Vec<_>>()
                    .join(";")
            }),
        CommandKind::Unregister => engine
            .unregister(command.course_id, &command.email)
            .await
            .map(|_| UNREGISTERED_MESSAGE.to_string()),
    };

    let (result, detail) = match result {
        Ok(detail) => (OutcomeKind::Ok, detail),
        Err(e) if e.is_client_error() => (OutcomeKind::Rejected, e.to_string()),
        Err(e) => return Err(e),
    };

    Ok(Outcome {
        action: command.action,
        course_id: command.course_id,
        email: command.email,
        result,
        detail,
    })
}
