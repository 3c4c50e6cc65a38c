//! Codec module - the typed message model and the frame decoder.
//!
//! [`decode_message`] turns one [`crate::protocol::Frame`] into one
//! [`Message`]; FRAME_DOWN aggregates are unpacked recursively, with
//! optional zstd decompression of the nested blob.

mod decode;
mod message;

pub use decode::decode_message;
pub use message::{FrameDownBody, Message, MessageBody, NotifyBody};
