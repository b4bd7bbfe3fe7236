//! AI components

pub mod behavior;


pub use behavior::*;
