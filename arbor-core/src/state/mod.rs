//! Panel and run state
//!
//! The panel cursor and the run state are orthogonal: the cursor decides
//! what a button means, the run state decides whether the schedule is being
//! evaluated. Transitions are pure and return an [`Effect`] for the
//! controller to apply against the program store.

pub mod cursor;
pub mod events;
pub mod machine;

pub use cursor::{Cursor, Effect};
pub use events::{Button, PanelInput};
pub use machine::{ActiveRun, RunState, StopReason};
