//! Configuration types
//!
//! Fixed domain limits plus the tunable timing parameters a board supplies
//! at startup.

pub mod limits;
pub mod timing;

pub use limits::*;
pub use timing::*;
