//! Handler registry and isolated dispatch.
//!
//! Two independent tables route decoded messages: one keyed by message
//! type, one keyed by (service id, method id) for NOTIFY messages. Both
//! are mutated only during process startup; capture reads them without
//! synchronization because the pipeline is single-threaded.
//!
//! Dispatch is isolated: a handler returning an error is logged with full
//! context and never propagates. A single malformed or buggy handler must
//! never halt the capture loop.

use std::collections::HashMap;

use crate::codec::{Message, NotifyBody};
use crate::error::Result;
use crate::protocol::MessageType;

/// Handler for non-NOTIFY messages. Receives the registry so aggregate
/// handlers (FRAME_DOWN) can re-dispatch their nested messages.
pub type MessageHandler = Box<dyn Fn(&Message, &HandlerRegistry) -> Result<()> + Send + Sync>;

/// Handler for NOTIFY messages, keyed by (service id, method id).
pub type NotifyHandler = Box<dyn Fn(&Message, &NotifyBody) -> Result<()> + Send + Sync>;

/// Registry mapping message types and notify keys to handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    by_type: HashMap<MessageType, MessageHandler>,
    by_notify: HashMap<(u64, u32), NotifyHandler>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a message type.
    ///
    /// Last registration wins; overwriting an existing binding logs a
    /// warning (supports hot-swapping handlers in tests).
    pub fn register_message_handler<F>(&mut self, msg_type: MessageType, handler: F)
    where
        F: Fn(&Message, &HandlerRegistry) -> Result<()> + Send + Sync + 'static,
    {
        if self.by_type.contains_key(&msg_type) {
            tracing::warn!("overriding existing handler for message type {msg_type}");
        }
        self.by_type.insert(msg_type, Box::new(handler));
    }

    /// Register a handler for a (service id, method id) pair.
    ///
    /// Last registration wins; overwriting logs a warning.
    pub fn register_notify_handler<F>(&mut self, service_id: u64, method_id: u32, handler: F)
    where
        F: Fn(&Message, &NotifyBody) -> Result<()> + Send + Sync + 'static,
    {
        if self.by_notify.contains_key(&(service_id, method_id)) {
            tracing::warn!(
                "overriding existing handler for service {service_id:#018X}, method {method_id:#010X}"
            );
        }
        self.by_notify.insert((service_id, method_id), Box::new(handler));
    }

    /// Whether a message-type handler is bound.
    pub fn has_message_handler(&self, msg_type: MessageType) -> bool {
        self.by_type.contains_key(&msg_type)
    }

    /// Whether a notify handler is bound for this key.
    pub fn has_notify_handler(&self, service_id: u64, method_id: u32) -> bool {
        self.by_notify.contains_key(&(service_id, method_id))
    }

    /// Route one decoded message to its handler.
    ///
    /// NOTIFY messages look up the (service, method) table; everything
    /// else looks up the type table. A missing handler is a debug-level
    /// event, not an error. Handler failures are caught and logged here;
    /// dispatch always returns normally.
    pub fn dispatch(&self, message: &Message) {
        if let Some(notify) = message.as_notify() {
            let key = (notify.service_id, notify.method_id);
            let Some(handler) = self.by_notify.get(&key) else {
                tracing::debug!(
                    "no Notify handler for service {:#018X}, method {:#010X}",
                    notify.service_id,
                    notify.method_id
                );
                return;
            };
            if let Err(e) = handler(message, notify) {
                tracing::error!(
                    "error in Notify handler for service {:#018X}, method {:#010X}: {e}",
                    notify.service_id,
                    notify.method_id
                );
            }
        } else {
            let Some(handler) = self.by_type.get(&message.msg_type) else {
                tracing::debug!("no handler for message type {}", message.msg_type);
                return;
            };
            if let Err(e) = handler(message, self) {
                tracing::error!("error in message handler for {}: {e}", message.msg_type);
            }
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("by_type", &self.by_type.keys().collect::<Vec<_>>())
            .field("by_notify", &self.by_notify.keys().collect::<Vec<_>>())
            .finish()
    }
}
