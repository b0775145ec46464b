//! Core utilities: simulation time

pub mod time;

pub use time::SimClock;
