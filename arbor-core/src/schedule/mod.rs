//! Irrigation schedule evaluation
//!
//! Both the program evaluator and the backwash interleaver are driven by the
//! same elapsed-time value `ct`, counted in elapsed units since run start
//! (minutes normally, faster units under speed-up). They are evaluated once
//! per change of `ct`, never on every poll.

pub mod activity;
pub mod backwash;
pub mod evaluator;

pub use activity::{StationActivity, StationMask, StationState};
pub use backwash::Backwash;
pub use evaluator::{active_station, evaluate, DurationSource};
