//! Rendering for the chat view.
//!
//! - [`Render`]: anything that can draw a [`ChatState`]
//! - [`terminal`]: line-oriented renderer used by the `chat` subcommand

use std::io;

use crate::chat::ChatState;

pub mod terminal;

pub use terminal::TerminalRenderer;

/// Draws the view after every state change.
pub trait Render {
    fn render(&mut self, state: &ChatState) -> io::Result<()>;
}
