//! The capture loop: packets in, dispatched messages out.
//!
//! One synchronous pipeline per packet: parse headers, classify the flow,
//! reassemble, decode, dispatch. No internal queueing - a packet is fully
//! processed before the next one is read, which keeps per-flow decoding in
//! order and handler ordering deterministic.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::codec::decode_message;
use crate::error::{hex_preview, CaptureError, Result};
use crate::handler::HandlerRegistry;
use crate::protocol::{is_game_payload, Frame, FrameBuffer};

use super::packet::{parse_segment, FlowKey, TcpSegment};
use super::source::PacketSource;

/// Default bound on waiting for the capture thread to wind down.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Packet capture pipeline.
///
/// Owns one reassembly buffer per (flow, direction); buffers appear when a
/// flow first classifies as game traffic and disappear when capture stops.
pub struct PacketCapture {
    registry: Arc<HandlerRegistry>,
    client_ip: Ipv4Addr,
    flows: HashMap<FlowKey, FrameBuffer>,
    stop: Arc<AtomicBool>,
}

impl PacketCapture {
    /// Create a capture pipeline.
    ///
    /// `client_ip` identifies the local game client; segments sourced from
    /// it are decoded as client-to-server traffic.
    pub fn new(registry: Arc<HandlerRegistry>, client_ip: Ipv4Addr) -> Self {
        Self {
            registry,
            client_ip,
            flows: HashMap::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shareable stop flag; setting it ends [`run`](Self::run) at the next
    /// packet boundary.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Drive the pipeline until the source ends or the stop flag is set.
    ///
    /// The stop flag is only polled between packets; a packet currently in
    /// flight is always processed to completion.
    pub fn run(&mut self, source: &mut dyn PacketSource) -> Result<()> {
        let link = source.link_type();
        tracing::info!("starting packet capture (client ip {})", self.client_ip);

        while !self.stop.load(Ordering::Relaxed) {
            let Some(packet) = source.next_packet()? else {
                break;
            };
            let Some(segment) = parse_segment(link, &packet) else {
                continue;
            };
            if segment.payload.is_empty() {
                continue;
            }
            self.on_segment(&segment);
        }

        tracing::info!("packet capture stopped ({} tracked flows)", self.flows.len());
        self.flows.clear();
        Ok(())
    }

    /// Process one reassembled TCP span.
    ///
    /// Flows without a buffer yet are gated by the protocol classifier;
    /// everything after the first accepted span feeds the flow's buffer
    /// directly.
    fn on_segment(&mut self, segment: &TcpSegment<'_>) {
        let buffer = match self.flows.entry(segment.flow_key()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !is_game_payload(segment.payload) {
                    return;
                }
                tracing::info!("new game flow {} -> {}", segment.src, segment.dst);
                entry.insert(FrameBuffer::new())
            }
        };
        let result = buffer.push(segment.payload);

        let is_from_client = *segment.src.ip() == self.client_ip;
        for frame in &result.frames {
            self.handle_frame(frame, is_from_client, segment);
        }

        if let Some(declared) = result.malformed {
            // Non-fatal per-flow event: the buffer already dropped the bad
            // bytes, capture resumes on the next segment.
            tracing::warn!(
                "{} -> {}: {}",
                segment.src,
                segment.dst,
                CaptureError::MalformedLength { declared }
            );
        }
    }

    fn handle_frame(&self, frame: &Frame, is_from_client: bool, segment: &TcpSegment<'_>) {
        match decode_message(frame, is_from_client) {
            Ok(message) => self.registry.dispatch(&message),
            Err(e) => {
                tracing::error!("packet processing failed: {e}");
                tracing::info!(
                    "PDU {} -> {} len={} data={}",
                    segment.src,
                    segment.dst,
                    frame.total_len(),
                    hex_preview(&frame.body)
                );
            }
        }
    }

    /// Run the pipeline on a background thread.
    ///
    /// This is the optional deployment mode; the returned handle stops the
    /// loop cooperatively and joins with a bounded wait.
    pub fn spawn<S>(mut self, mut source: S) -> CaptureHandle
    where
        S: PacketSource + Send + 'static,
    {
        let stop = self.stop_flag();
        let thread = std::thread::spawn(move || self.run(&mut source));
        CaptureHandle { stop, thread }
    }
}

/// Handle to a background capture thread.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Result<()>>,
}

impl CaptureHandle {
    /// Request a stop and wait up to `timeout` for the thread to finish.
    ///
    /// Stopping is not instantaneous: the flag is honored at per-packet
    /// boundaries. If the thread does not wind down within the timeout the
    /// shutdown is reported as incomplete rather than blocking forever;
    /// already-dispatched handler side effects are never rolled back.
    pub fn stop(self, timeout: Duration) -> Result<()> {
        self.stop.store(true, Ordering::Relaxed);

        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                tracing::error!("capture thread did not stop within {timeout:?}");
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        match self.thread.join() {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("capture thread panicked");
                Ok(())
            }
        }
    }

    /// Whether the capture thread has finished on its own.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}
