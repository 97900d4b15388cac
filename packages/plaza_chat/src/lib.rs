//! Chat room state, presence tracking, and message fan-out for Plaza.

pub mod protocol;
pub mod room;

pub use protocol::{ClientEvent, ServerEvent};
pub use room::{ChatRoom, FanoutSnapshot, RoomSender};
