//! TrueLens terminal client.
//!
//! Talks to the TrueLens analysis backend (claim extraction, verification,
//! trend clustering and source scanning all happen server-side) and presents
//! the results as a terminal dashboard, a standalone analysis panel, or
//! one-shot commands.
//!
//! - [`api`] - HTTP client and wire types
//! - [`session`] - analysis session state machine
//! - [`report`] - report text parsing
//! - [`app`] - UI state over the session
//! - [`ui`] - ratatui rendering and the event loop
//! - [`cli`] - argument parsing and one-shot commands

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod keybindings;
pub mod report;
pub mod session;
pub mod ui;
pub mod util;
