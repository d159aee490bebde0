//! Per-sample run timers.
//!
//! `TimerState` is the client-local, ephemeral state for one sample's
//! elapsed-time measurement; `TimerBoard` is the list view's mapping from
//! sample id to state. The board is the single owner of timer entries -
//! controllers mutate entries only through it, and a refetch rebuilds it
//! wholesale from server truth.

mod board;
mod state;

pub use board::TimerBoard;
pub use state::{TimerState, TransitionError};
