//! Dataset containers and synthetic process data generation.

pub mod sample;

pub use sample::*;
