//! # LeaveDesk Library
//!
//! This library exposes the LeaveDesk modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;

// Re-export leavedesk_core for convenience
pub use leavedesk_core;
