//! Prompt templates for the research analysts
//!
//! Templates are organized into:
//! - `system`: fixed persona instructions for each analyst
//! - `user`: per-run prompts embedding the ticker and upstream results

mod system;
mod user;

pub use system::*;
pub use user::*;
