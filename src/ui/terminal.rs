//! Terminal renderer.
//!
//! Output is append-only: each render prints the header when the status
//! changed and then only the messages that were not printed yet.

use std::io::{self, Write};

use crate::chat::{ChatState, ConnectionStatus, Message, Role};
use crate::ui::Render;

/// Header title.
pub const TITLE: &str = "Demo Support Chat";

const USER_LABEL: &str = "you ›";
const ASSISTANT_LABEL: &str = "assistant ›";

/// Incremental line renderer over any writer.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    printed: usize,
    last_status: Option<ConnectionStatus>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            last_status: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_header(&mut self, status: ConnectionStatus) -> io::Result<()> {
        writeln!(self.out, "── {TITLE} · {} ──", status.label())?;
        writeln!(self.out, "   ({})", status.placeholder())
    }

    fn write_message(&mut self, message: &Message) -> io::Result<()> {
        let label = match message.role() {
            Role::User => USER_LABEL,
            Role::Assistant => ASSISTANT_LABEL,
        };
        let indent = " ".repeat(label.chars().count());

        let mut lines = message.text().split('\n');
        let first = lines.next().unwrap_or_default();
        writeln!(self.out, "{label} {first}")?;
        for line in lines {
            writeln!(self.out, "{indent} {line}")?;
        }
        Ok(())
    }
}

impl<W: Write> Render for TerminalRenderer<W> {
    fn render(&mut self, state: &ChatState) -> io::Result<()> {
        if self.last_status != Some(state.status()) {
            self.write_header(state.status())?;
            self.last_status = Some(state.status());
        }

        let pending = state.messages().get(self.printed..).unwrap_or_default();
        for message in pending {
            self.write_message(message)?;
        }
        self.printed = state.messages().len();

        self.out.flush()
    }
}
