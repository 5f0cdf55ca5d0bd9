//! Coordination core for the agenda UI.
//!
//! Everything in this crate is a deterministic state machine driven by the
//! host toolkit: gesture recognizers hand in begin/move/end transitions,
//! paged scroll surfaces report drag offsets and momentum ends, and the
//! machines answer with scroll requests and commit effects. No rendering
//! happens here, which is also what makes the synchronization protocol
//! between the date picker and the day timeline testable without a UI.

pub mod date;
pub mod day_pager;
pub mod error;
pub mod event;
pub mod interaction;
pub mod month_pager;
pub mod selection;
pub mod timegrid;
pub mod week_pager;

pub use error::Error;
pub use event::{EventPatch, OverrideStore, TimedEvent};
pub use selection::{SelectionSource, SelectionStore};

pub type Result<T> = core::result::Result<T, error::Error>;
