//! Typed message model produced by the decoder.
//!
//! A [`Message`] is immutable once constructed: created from one frame,
//! consumed exactly once by dispatch, then discarded. No session state
//! spans messages.

use bytes::Bytes;

use crate::protocol::MessageType;

/// Fields of a NOTIFY message: a one-way service-method invocation.
#[derive(Debug, Clone)]
pub struct NotifyBody {
    /// Target service identifier (8 bytes BE on the wire).
    pub service_id: u64,
    /// Service stub instance.
    pub stub_id: u32,
    /// Invoked method.
    pub method_id: u32,
    /// Everything after the 16-byte header; `None` when empty.
    pub payload: Option<Bytes>,
}

/// Fields of a FRAME_DOWN message: an ordered aggregate of nested messages.
#[derive(Debug, Clone)]
pub struct FrameDownBody {
    /// Downstream sequence number.
    pub sequence_id: u32,
    /// Nested messages in encounter order (possibly empty).
    pub nested: Vec<Message>,
}

/// Type-specific message content.
#[derive(Debug, Clone)]
pub enum MessageBody {
    /// CALL, RETURN, ECHO, FRAME_UP, ACK_FRAME_UP: body bytes are
    /// intentionally discarded.
    Bare,
    /// NOTIFY with its parsed header and trailing payload.
    Notify(NotifyBody),
    /// FRAME_DOWN with its recursively decoded children.
    FrameDown(FrameDownBody),
    /// ACK_FRAME_DOWN keeps its body verbatim, diagnostics only.
    AckFrameDown {
        /// Raw as-received body; `None` when empty.
        payload: Option<Bytes>,
    },
}

/// A decoded protocol message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Top-level message kind.
    pub msg_type: MessageType,
    /// Whether the locally-identified client sent this message.
    pub is_from_client: bool,
    /// Type-specific content.
    pub body: MessageBody,
}

impl Message {
    /// Human-readable traffic direction for log lines.
    pub fn direction(&self) -> &'static str {
        if self.is_from_client {
            "client->server"
        } else {
            "server->client"
        }
    }

    /// Notify fields, if this is a NOTIFY message.
    pub fn as_notify(&self) -> Option<&NotifyBody> {
        match &self.body {
            MessageBody::Notify(n) => Some(n),
            _ => None,
        }
    }

    /// FrameDown fields, if this is a FRAME_DOWN message.
    pub fn as_frame_down(&self) -> Option<&FrameDownBody> {
        match &self.body {
            MessageBody::FrameDown(f) => Some(f),
            _ => None,
        }
    }
}
