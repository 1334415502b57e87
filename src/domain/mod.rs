//! Domain layer: the records the engine reads and writes, the pricing rule,
//! and the ports the engine depends on.

pub mod clock;
pub mod course;
pub mod ports;
pub mod pricing;
pub mod registration;
pub mod student;
