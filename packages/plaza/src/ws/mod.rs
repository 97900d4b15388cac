//! Chat WebSocket Handler
//!
//! Per-connection session lifecycle: a connection is attached on upgrade,
//! becomes a participant only after an explicit Join, and is cleaned out of
//! the registry and the typing set when the transport drops.

mod dispatch;
mod handler;

pub use handler::handle_chat_ws;
