//! Demo support chat
//!
//! A small realtime chat client and the development proxy it talks through.
//!
//! # Architecture
//!
//! - **Chat view**: headless view model owning status, messages, input and a
//!   single realtime connection
//! - **Transport**: WebSocket connection and the event loop that drives the view
//! - **UI**: terminal rendering of the view
//! - **Dev proxy**: Axum server applying path-prefix proxy rules, with
//!   WebSocket upgrade bridging
//! - **Demo backend**: canned-reply `/ws` endpoint behind the default rule
//!
//! # Modules
//!
//! - [`chat`]: View model and connection seam
//! - [`transport`]: WebSocket connection and chat session loop
//! - [`ui`]: Renderers
//! - [`proxy`]: Proxy rules and forwarding
//! - [`server`]: Dev server assembly
//! - [`backend`]: Demo backend
//! - [`config`]: Layered configuration and CLI

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod proxy;
pub mod server;
pub mod transport;
pub mod ui;
