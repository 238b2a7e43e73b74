//! Platform collaborators
//!
//! - `native`: JSON file score store for the headless CLI
//! - `web`: hosted REST leaderboard, config fetch and query-string helpers

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(target_arch = "wasm32")]
pub mod web;
