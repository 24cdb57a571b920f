//! Foundation types for WebShell.
//!
//! This crate contains the platform-agnostic types shared by all WebShell
//! crates: navigation events, gate decisions, shell configuration, and
//! error types.

pub mod config;
pub mod error;
pub mod event;
