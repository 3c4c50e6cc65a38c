//! Seam to the outbound chat-forwarding client.
//!
//! The reconnecting WebSocket publisher lives outside this crate; the
//! capture side only knows the [`ChatSink`] trait and hands it decoded
//! chat events.

use crate::error::Result;

/// One decoded chat event, ready for forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Server timestamp of the chat message.
    pub timestamp: u64,
    /// Wire channel-type ordinal.
    pub channel_type: u32,
    /// Human-readable channel name (see
    /// [`crate::protocol::services::chat_channel_name`]).
    pub channel_name: String,
    /// Sending character's id.
    pub character_id: String,
    /// Sending character's display name.
    pub character_name: String,
    /// Message text.
    pub text: String,
}

/// Consumer of decoded chat events.
///
/// Implementations are expected to be non-blocking or to hand work off
/// themselves; they run on the capture thread.
pub trait ChatSink: Send + Sync {
    /// Deliver one chat event. Failures are logged at the dispatch
    /// boundary and never reach the capture loop.
    fn send_chat_message(&self, message: &ChatMessage) -> Result<()>;
}
