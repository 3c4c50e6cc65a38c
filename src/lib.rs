//! # bpsr
//!
//! Passive network analysis for the BPSR game protocol.
//!
//! The crate reassembles length-delimited frames out of captured TCP
//! traffic, decodes them into typed messages (including recursive
//! FRAME_DOWN batches with zstd-compressed bodies), and dispatches each
//! one through a two-level handler registry.
//!
//! ## Architecture
//!
//! - **Capture** (`capture`): packet sources, IPv4/TCP dissection, and the
//!   synchronous per-packet pipeline
//! - **Protocol** (`protocol`): wire constants, frame parsing, stream
//!   reassembly, and traffic classification
//! - **Codec** (`codec`): frame body decoding into typed messages
//! - **Handlers** (`handler`): registration and isolated dispatch
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bpsr::capture::{PacketCapture, PcapFileSource};
//! use bpsr::handler::{register_general_handlers, HandlerRegistry};
//!
//! fn main() -> bpsr::Result<()> {
//!     let mut registry = HandlerRegistry::new();
//!     register_general_handlers(&mut registry);
//!
//!     let mut source = PcapFileSource::open("session.pcap".as_ref())?;
//!     let mut capture = PacketCapture::new(Arc::new(registry), "10.0.0.2".parse().unwrap());
//!     capture.run(&mut source)
//! }
//! ```

pub mod capture;
pub mod codec;
pub mod config;
pub mod error;
pub mod forward;
pub mod handler;
pub mod protocol;

pub use error::{CaptureError, Result};
