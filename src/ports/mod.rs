//! Ports (trait boundaries) between the simulation core and its observers.

pub mod observer;

pub use observer::Observer;
