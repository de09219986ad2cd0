//! Event loop for a mounted chat view.

use std::io;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::SplitStream;
use tracing::info;
use url::Url;

use super::websocket::WsConnection;
use crate::chat::{ChatState, ChatView, Connection, ConnectionEvent};
use crate::error::Result;
use crate::ui::Render;

/// Input lines from `reader`, decoded as lossy UTF-8 with `\n` or `\r\n` endings
/// removed. A stray invalid byte never ends the session.
pub fn input_lines<R>(reader: R) -> impl Stream<Item = io::Result<String>> + Unpin
where
    R: AsyncBufRead + Unpin,
{
    SplitStream::new(reader.split(b'\n')).map(|line| {
        line.map(|bytes| {
            let text = String::from_utf8_lossy(&bytes);
            text.strip_suffix('\r').unwrap_or(&*text).to_owned()
        })
    })
}

/// Couples a view with its event source and a renderer.
///
/// All view mutation happens inside [`ChatSession::run`], one event or input
/// line at a time.
#[derive(Debug)]
pub struct ChatSession<C: Connection, R: Render> {
    view: ChatView<C>,
    events: mpsc::UnboundedReceiver<ConnectionEvent>,
    renderer: R,
}

impl<R: Render> ChatSession<WsConnection, R> {
    /// Open a WebSocket to `url` and mount a view over it.
    pub fn connect(url: Url, greeting: Option<&str>, renderer: R) -> Self {
        let (connection, events) = WsConnection::open(url);
        Self::new(ChatView::mount(connection, greeting), events, renderer)
    }
}

impl<C: Connection, R: Render> ChatSession<C, R> {
    pub fn new(
        view: ChatView<C>,
        events: mpsc::UnboundedReceiver<ConnectionEvent>,
        renderer: R,
    ) -> Self {
        Self {
            view,
            events,
            renderer,
        }
    }

    pub fn view(&self) -> &ChatView<C> {
        &self.view
    }

    /// Run until `input` ends, then unmount and return the final state.
    ///
    /// Each input item is one submitted line. The connection is released on
    /// every exit path, errors included.
    pub async fn run<S>(mut self, mut input: S) -> Result<ChatState>
    where
        S: Stream<Item = io::Result<String>> + Unpin,
    {
        self.renderer.render(self.view.state())?;

        let mut events_open = true;
        loop {
            tokio::select! {
                biased;
                event = self.events.recv(), if events_open => match event {
                    Some(event) => self.view.handle_event(event),
                    None => {
                        events_open = false;
                        continue;
                    }
                },
                line = input.next() => match line {
                    Some(line) => {
                        self.view.set_input(line?);
                        self.view.submit();
                    }
                    None => break,
                },
            }
            self.renderer.render(self.view.state())?;
        }

        info!(name: "chat.session.ended", messages = self.view.state().messages().len(), "Chat session ended");
        Ok(self.view.unmount())
    }
}
