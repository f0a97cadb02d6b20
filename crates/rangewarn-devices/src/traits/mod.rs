//! Capability traits at the hardware boundary.
//!
//! GPIO and delays come straight from `embedded-hal`; the traits here cover
//! what it has no vocabulary for: free-running clocks, echo pulse timing and
//! a source of distance readings.

pub mod clock;
pub mod pulse;
pub mod source;
