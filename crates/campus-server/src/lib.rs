//! Shared library surface for the campus route server and its tests.

pub mod api;
pub mod config;
pub mod state;
