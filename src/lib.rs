//! subforge - extract ASS/SSA subtitle tracks from Matroska files
//!
//! This library crate exposes the orchestration layer for the binary and
//! for integration testing.

pub mod batch;
pub mod config;
pub mod report;
pub mod server;
