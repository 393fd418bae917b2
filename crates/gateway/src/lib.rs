//! `dp-gateway`: the DeskPilot assistant service.
//!
//! Hosts `POST /api/assistant`, which answers one user message by running a
//! bounded streaming tool-calling loop against an OpenAI-compatible model
//! and the workspace's data layer.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
