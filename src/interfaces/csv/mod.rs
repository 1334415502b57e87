//! CSV codecs for catalog import, batch commands and batch outcomes.

pub mod catalog_reader;
pub mod command_reader;
pub mod outcome_writer;
