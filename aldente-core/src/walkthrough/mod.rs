//! Step-by-step cooking walkthrough: which screen is shown and the
//! per-step countdown timers.
//!
//! This is plain state with no UI or clock attached. A front end feeds it
//! user actions and, for running timers, drives
//! [`TimerBoard::set_remaining`] from its own tick source.

mod navigation;
mod session;
mod timers;

pub use navigation::{NavAction, NavigationError, Navigator, View};
pub use session::{LoadState, SessionError, WalkthroughSession};
pub use timers::{derive_timer_states, TimerBoard, TimerError, TimerState};
