//! Utility functions shared by the session and UI layers.
//!
//! - **Text**: width-aware truncation and control-sequence stripping for
//!   rendering backend-supplied strings in a terminal
//! - **URLs**: scheme check before opening article links
//! - **Tasks**: panic capture for spawned background work

mod links;
mod task;
mod text;

pub use links::{validate_url_for_open, OpenUrlError};
pub use task::catch_task_panic;
pub use text::{display_width, sanitize, single_line, truncate_to_width, wrap_to_width};
