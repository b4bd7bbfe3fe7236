//! AI systems (logic tick)

pub mod behavior;


pub use behavior::*;
