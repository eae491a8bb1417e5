//! Mutation watching — debounced rescans over a churning document.

pub mod debounce;
pub mod observer;

pub use debounce::{wait, Debouncer};
pub use observer::{RescanCoordinator, WatchState};
