mod chat;
mod health;
mod websocket;

pub use chat::list_participants;
pub use health::{health_handler, health_live_handler, metrics_handler};
pub use websocket::chat_websocket_handler;
