//! Platform abstraction layer
//!
//! Keeps wall-clock time and raw input events out of the simulation:
//! - `clock`: monotonic session time, real or manually stepped
//! - `input`: edge events folded into a per-tick command

pub mod clock;
pub mod input;

pub use clock::{Clock, ManualClock, SystemClock};
pub use input::{InputEvent, InputQueue};
