//! Path planning on top of a `NavigationOracle`.
//!
//! - path: `Path` (waypoints + cursor), `PathPlanner` (destination selection,
//!   recalculation timers), `PathConfig`
//! - systems: `plan_paths` (logic tick)

pub mod path;
pub mod systems;


pub use path::*;
pub use systems::*;
