//! Protocol module - wire format, framing, reassembly, and classification.
//!
//! - Length-prefixed frame layout and the [`MessageType`] enumeration
//! - [`Frame`] parsing with an explicit three-way result
//! - [`FrameBuffer`] per-direction TCP reassembly
//! - Signature scan separating game traffic from everything else the
//!   capture filter lets through

mod frame;
mod frame_buffer;
mod signature;
mod wire;

pub use frame::{encode_frame, Frame, FrameParse};
pub use frame_buffer::{FrameBuffer, PushResult};
pub use signature::{is_game_payload, looks_like_protocol};
pub use wire::{
    services, MessageType, COMPRESSION_FLAG, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE,
    MESSAGE_TYPE_MASK, MIN_FRAME_SIZE,
};
