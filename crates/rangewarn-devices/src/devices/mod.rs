//! Concrete device drivers built on the capability traits.

pub mod buzzer;
pub mod led;
pub mod ultrasonic;
