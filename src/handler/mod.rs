//! Handler module - registration and isolated dispatch of decoded messages.
//!
//! Handlers are registered explicitly during process startup into two
//! lookup tables (by message type, by (service, method) pair) and the
//! registry is then handed to the capture loop; no ambient global state.
//!
//! # Example
//!
//! ```
//! use bpsr::handler::{register_general_handlers, HandlerRegistry};
//! use bpsr::protocol::MessageType;
//!
//! let mut registry = HandlerRegistry::new();
//! register_general_handlers(&mut registry);
//! registry.register_message_handler(MessageType::Call, |msg, _registry| {
//!     println!("[{}] CALL", msg.direction());
//!     Ok(())
//! });
//! ```

mod general;
mod notify;
mod registry;

pub use general::register_general_handlers;
pub use notify::{register_chat_forwarder, register_world_handlers};
pub use registry::{HandlerRegistry, MessageHandler, NotifyHandler};
