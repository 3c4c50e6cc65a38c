//! Built-in handlers for the non-NOTIFY message types.
//!
//! These log traffic at debug level; the FRAME_DOWN handler additionally
//! re-dispatches every nested message through the same registry, so each
//! child gets the same isolation guarantee as a top-level message.

use crate::error::{hex_preview, CaptureError};
use crate::protocol::MessageType;

use super::registry::HandlerRegistry;

/// Register the stock handlers for ECHO, FRAME_UP, FRAME_DOWN,
/// ACK_FRAME_UP, and ACK_FRAME_DOWN.
pub fn register_general_handlers(registry: &mut HandlerRegistry) {
    registry.register_message_handler(MessageType::Echo, |msg, _| {
        tracing::debug!("[{}] ECHO message", msg.direction());
        Ok(())
    });

    registry.register_message_handler(MessageType::FrameUp, |msg, _| {
        tracing::debug!("[{}] FRAME_UP message", msg.direction());
        Ok(())
    });

    registry.register_message_handler(MessageType::FrameDown, |msg, registry| {
        let Some(frame_down) = msg.as_frame_down() else {
            return Err(CaptureError::Handler(
                "FRAME_DOWN message carries no frame body".into(),
            ));
        };
        tracing::debug!(
            "[{}] FRAME_DOWN: seq={}, nested_messages={}",
            msg.direction(),
            frame_down.sequence_id,
            frame_down.nested.len()
        );
        for nested in &frame_down.nested {
            registry.dispatch(nested);
        }
        Ok(())
    });

    registry.register_message_handler(MessageType::AckFrameUp, |msg, _| {
        tracing::debug!("[{}] ACK_FRAME_UP message", msg.direction());
        Ok(())
    });

    registry.register_message_handler(MessageType::AckFrameDown, |msg, _| {
        let payload = match &msg.body {
            crate::codec::MessageBody::AckFrameDown { payload } => payload.as_deref(),
            _ => None,
        };
        tracing::debug!(
            "[{}] ACK_FRAME_DOWN message: {} bytes, preview = {}",
            msg.direction(),
            payload.map_or(0, <[u8]>::len),
            payload.map_or_else(|| "N/A".to_string(), hex_preview)
        );
        Ok(())
    });
}
