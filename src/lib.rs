//! mortydex - Rick and Morty character browser TUI
//!
//! This library exposes the app's modules for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod episode_cache;
pub mod reducer;
pub mod state;
pub mod storage;
