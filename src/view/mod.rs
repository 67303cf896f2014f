//! View-state synchronization between the page and its location identifier.

mod controller;
mod history;
pub mod location;
mod state;

pub use controller::*;
pub use history::*;
pub use state::*;
