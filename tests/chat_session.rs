//! Chat view over a real WebSocket, directly and through the dev proxy.

mod common;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::UnboundedReceiverStream;
use url::Url;

use common::{
    TIMEOUT, dead_addr, rule, spawn_backend, spawn_demo_backend, spawn_dev_server, test_config,
};
use demo_support_chat::backend::{FAREWELL_REPLY, GREETING_REPLY};
use demo_support_chat::chat::{
    ChatState, ChatView, ConnectionEvent, ConnectionStatus, DEFAULT_GREETING, FramePayload,
    NOT_CONNECTED_TEXT, Role, SendOutcome,
};
use demo_support_chat::transport::{ChatSession, ReadyState, WsConnection};
use demo_support_chat::ui::Render;

async fn next_event(events: &mut mpsc::UnboundedReceiver<ConnectionEvent>) -> ConnectionEvent {
    timeout(TIMEOUT, events.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_view_round_trip_through_proxy() {
    let backend = spawn_backend().await;
    let static_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(vec![rule("/ws", backend, true)], static_dir.path());
    let proxy = spawn_dev_server(&config).await;
    config.server.port = proxy.port();

    let url = config.chat_url(None).unwrap();
    assert_eq!(url.as_str(), format!("ws://{proxy}/ws"));

    let (conn, mut events) = WsConnection::open(url);
    let mut view = ChatView::mount(conn, Some(DEFAULT_GREETING));
    assert_eq!(view.state().status(), ConnectionStatus::Connecting);

    let event = next_event(&mut events).await;
    assert_eq!(event, ConnectionEvent::Open);
    view.handle_event(event);
    assert_eq!(view.state().status(), ConnectionStatus::Connected);

    view.set_input("where is my order?");
    assert_eq!(view.submit(), SendOutcome::Sent);

    let event = next_event(&mut events).await;
    assert_eq!(
        event,
        ConnectionEvent::Frame(FramePayload::Text("echo: where is my order?".into()))
    );
    view.handle_event(event);

    let messages: Vec<(Role, &str)> = view
        .state()
        .messages()
        .iter()
        .map(|m| (m.role(), m.text()))
        .collect();
    assert_eq!(
        messages,
        vec![
            (Role::Assistant, DEFAULT_GREETING),
            (Role::User, "where is my order?"),
            (Role::Assistant, "echo: where is my order?"),
        ]
    );

    view.unmount();
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Close);
}

#[tokio::test]
async fn test_demo_backend_answers_through_proxy() {
    let backend = spawn_demo_backend().await;
    let static_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(vec![rule("/ws", backend, true)], static_dir.path());
    let proxy = spawn_dev_server(&config).await;
    config.server.port = proxy.port();

    let (conn, mut events) = WsConnection::open(config.chat_url(None).unwrap());
    let mut view = ChatView::mount(conn, None);
    view.handle_event(next_event(&mut events).await);
    assert_eq!(view.state().status(), ConnectionStatus::Connected);

    assert_eq!(view.send("hello"), SendOutcome::Sent);
    let event = next_event(&mut events).await;
    assert_eq!(
        event,
        ConnectionEvent::Frame(FramePayload::Text(GREETING_REPLY.into()))
    );
    view.handle_event(event);

    // no canned reply; the next frame answers the farewell
    assert_eq!(view.send("where is my order?"), SendOutcome::Sent);
    assert_eq!(view.send("bye"), SendOutcome::Sent);
    let event = next_event(&mut events).await;
    assert_eq!(
        event,
        ConnectionEvent::Frame(FramePayload::Text(FAREWELL_REPLY.into()))
    );
    view.handle_event(event);

    let texts: Vec<&str> = view.state().messages().iter().map(|m| m.text()).collect();
    assert_eq!(
        texts,
        vec!["hello", GREETING_REPLY, "where is my order?", "bye", FAREWELL_REPLY]
    );
}

#[tokio::test]
async fn test_open_socket_waits_for_open_event_before_sending() {
    let backend = spawn_backend().await;
    let url = Url::parse(&format!("ws://{backend}/ws")).unwrap();
    let (conn, mut events) = WsConnection::open(url);

    timeout(TIMEOUT, async {
        while conn.ready_state() != ReadyState::Open {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let mut view = ChatView::mount(conn, None);
    assert_eq!(view.send("early"), SendOutcome::NotConnected);
    assert_eq!(view.state().status(), ConnectionStatus::Connecting);

    let event = next_event(&mut events).await;
    assert_eq!(event, ConnectionEvent::Open);
    view.handle_event(event);

    assert_eq!(view.send("later"), SendOutcome::Sent);
    assert_eq!(
        next_event(&mut events).await,
        ConnectionEvent::Frame(FramePayload::Text("echo: later".into()))
    );

    let texts: Vec<&str> = view.state().messages().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["early", NOT_CONNECTED_TEXT, "later"]);
}

#[tokio::test]
async fn test_refused_connection_disconnects_and_sends_nothing() {
    let url = Url::parse(&format!("ws://{}/ws", dead_addr())).unwrap();
    let (conn, mut events) = WsConnection::open(url);
    let mut view = ChatView::mount(conn, None);

    loop {
        let event = next_event(&mut events).await;
        let done = event == ConnectionEvent::Close;
        view.handle_event(event);
        if done {
            break;
        }
    }
    assert_eq!(view.state().status(), ConnectionStatus::Disconnected);

    assert_eq!(view.send("hello?"), SendOutcome::NotConnected);
    let last = view.state().messages().last().unwrap();
    assert_eq!(last.role(), Role::Assistant);
    assert_eq!(last.text(), NOT_CONNECTED_TEXT);
}

#[derive(Debug, Clone, Default)]
struct Recorder(Arc<Mutex<Vec<ConnectionStatus>>>);

impl Render for Recorder {
    fn render(&mut self, state: &ChatState) -> io::Result<()> {
        self.0.lock().unwrap().push(state.status());
        Ok(())
    }
}

#[tokio::test]
async fn test_session_against_dead_backend() {
    let url = Url::parse(&format!("ws://{}/ws", dead_addr())).unwrap();
    let recorder = Recorder::default();
    let session = ChatSession::connect(url, Some(DEFAULT_GREETING), recorder.clone());

    let (line_tx, line_rx) = mpsc::unbounded_channel::<io::Result<String>>();
    let handle = tokio::spawn(session.run(UnboundedReceiverStream::new(line_rx)));

    tokio::time::sleep(Duration::from_millis(200)).await;
    line_tx.send(Ok("anyone there?".into())).unwrap();
    drop(line_tx);

    let state = timeout(TIMEOUT, handle).await.unwrap().unwrap().unwrap();
    assert_eq!(state.status(), ConnectionStatus::Disconnected);

    let texts: Vec<&str> = state.messages().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec![DEFAULT_GREETING, "anyone there?", NOT_CONNECTED_TEXT]);

    let statuses = recorder.0.lock().unwrap().clone();
    assert_eq!(statuses.first(), Some(&ConnectionStatus::Connecting));
    assert_eq!(statuses.last(), Some(&ConnectionStatus::Disconnected));
}
