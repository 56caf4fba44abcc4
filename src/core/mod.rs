//! Core module - global events and system ordering.
//!
//! This module provides the foundation that all other systems build upon.

mod events;
mod plugin;

pub use events::*;
pub use plugin::{CorePlugin, TickSet};
