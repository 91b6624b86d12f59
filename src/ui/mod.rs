//! Terminal User Interface module.
//!
//! Dashboard and standalone analysis panel over one [`App`](crate::app::App).
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Session event processing
//! - `render` - Layout and pane dispatch
//! - `analysis` - Analysis pane (report, claims, raw JSON)
//! - `trends` - Trending narratives list
//! - `articles` - Latest articles list
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod analysis;
mod articles;
mod events;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;
mod trends;

pub use analysis::plain_result_lines;
pub use articles::format_relative_time;
pub use loop_runner::{run, Action};
