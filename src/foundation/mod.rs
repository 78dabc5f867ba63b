//! Shared primitives: errors, geometry and colour, clocks, fixed-point helpers.

pub mod clock;
pub mod core;
pub mod error;
pub mod math;
