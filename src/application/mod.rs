//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `RegistrationEngine`, the single entry point for
//! registering and unregistering students. It owns the business rules and
//! drives the storage ports inside one unit of work per operation.

pub mod engine;
