//! Adapters that expose the engine to the outside world.

pub mod batch;
pub mod csv;
pub mod http;
