//! `dp-domain`: shared types for every DeskPilot crate: the error type,
//! the configuration tree, transcript and tool types, streaming events,
//! productivity records, and structured trace events.

pub mod config;
pub mod error;
pub mod records;
pub mod stream;
pub mod tool;
pub mod trace;
