//! Built-in NOTIFY handlers for the known services.
//!
//! The WORLD_NTF sync methods are logged at debug level with their payload
//! sizes. The chat handler decodes the raw payload with a
//! collaborator-supplied closure (protobuf in the real deployment) and
//! forwards the result into a [`ChatSink`].

use std::sync::Arc;

use crate::error::CaptureError;
use crate::forward::{ChatMessage, ChatSink};
use crate::protocol::services::{self, chit_chat_ntf, world_ntf};

use super::registry::HandlerRegistry;

/// Register debug-logging handlers for the six WORLD_NTF sync methods.
pub fn register_world_handlers(registry: &mut HandlerRegistry) {
    let methods: [(&str, u32); 6] = [
        ("SYNC_NEAR_ENTITIES", world_ntf::SYNC_NEAR_ENTITIES),
        ("SYNC_CONTAINER_DATA", world_ntf::SYNC_CONTAINER_DATA),
        ("SYNC_CONTAINER_DIRTY_DATA", world_ntf::SYNC_CONTAINER_DIRTY_DATA),
        ("SYNC_SERVER_TIME", world_ntf::SYNC_SERVER_TIME),
        ("SYNC_NEAR_DELTA_INFO", world_ntf::SYNC_NEAR_DELTA_INFO),
        ("SYNC_TO_ME_DELTA_INFO", world_ntf::SYNC_TO_ME_DELTA_INFO),
    ];

    for (name, method_id) in methods {
        registry.register_notify_handler(services::WORLD_NTF, method_id, move |msg, notify| {
            tracing::debug!(
                "[{}] {name}: {} bytes",
                msg.direction(),
                notify.payload.as_ref().map_or(0, bytes::Bytes::len)
            );
            Ok(())
        });
    }
}

/// Register the chat-notify handler.
///
/// `decode` turns a raw NOTIFY_NEWEST_CHIT_CHAT_MSGS payload into a
/// [`ChatMessage`] (returning `None` when the payload is not a chat push
/// worth forwarding); `sink` receives the result. Both run on the capture
/// thread under the dispatch isolation guarantee.
pub fn register_chat_forwarder<D>(registry: &mut HandlerRegistry, decode: D, sink: Arc<dyn ChatSink>)
where
    D: Fn(&[u8]) -> Option<ChatMessage> + Send + Sync + 'static,
{
    registry.register_notify_handler(
        services::CHIT_CHAT_NTF,
        chit_chat_ntf::NOTIFY_NEWEST_CHIT_CHAT_MSGS,
        move |_msg, notify| {
            let payload = notify
                .payload
                .as_ref()
                .ok_or_else(|| CaptureError::Handler("chat payload is empty".into()))?;

            let Some(chat) = decode(payload) else {
                return Ok(());
            };

            tracing::info!(
                "[{}] {}({}): {}",
                chat.channel_name,
                chat.character_name,
                chat.character_id,
                chat.text
            );
            sink.send_chat_message(&chat)
        },
    );
}
