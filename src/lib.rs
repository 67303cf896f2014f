//! Single-page portfolio site: markdown content, a location-synchronized
//! view state, and server-side rendering of both.

pub mod config;
pub mod content;
pub mod output;
pub mod stats;
pub mod util;
pub mod view;
