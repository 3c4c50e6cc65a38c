//! Reassembly buffer for one TCP stream direction.
//!
//! Uses `bytes::BytesMut` to accumulate undelivered bytes and extracts
//! every complete length-prefixed frame on each push. Partial frames stay
//! buffered until the next segment arrives; no frame is ever emitted
//! truncated, and frames completed before a malformed length are still
//! delivered.

use bytes::BytesMut;

use super::frame::{Frame, FrameParse};

/// Everything one push drained out of the buffer.
#[derive(Debug)]
pub struct PushResult {
    /// Frames completed by this push, in stream order.
    pub frames: Vec<Frame>,
    /// Declared length of a malformed frame hit after the last complete
    /// frame, if any. The buffered bytes were discarded so the flow can
    /// resynchronize on the next segment.
    pub malformed: Option<u32>,
}

/// Buffer accumulating incoming stream bytes and yielding complete frames.
///
/// One instance exists per (flow, direction); it lives for the life of the
/// TCP flow and is dropped when the flow closes or capture stops.
pub struct FrameBuffer {
    /// Accumulated undelivered bytes for this direction.
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Create an empty reassembly buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
        }
    }

    /// Append reassembled stream bytes and extract all complete frames.
    ///
    /// Returns every frame completed by this push, in stream order (handles
    /// multiple frames landing in one capture callback). If the trailing
    /// bytes form only part of a frame they are retained for the next push.
    ///
    /// A declared length outside `[6, 10 MiB]` ends extraction: the frames
    /// already completed are returned together with the bad length in
    /// [`PushResult::malformed`], and the remaining buffered bytes are
    /// discarded.
    pub fn push(&mut self, data: &[u8]) -> PushResult {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        loop {
            match Frame::parse(&self.buffer) {
                FrameParse::Complete { frame, consumed } => {
                    let _ = self.buffer.split_to(consumed);
                    frames.push(frame);
                }
                FrameParse::NeedMore => {
                    return PushResult {
                        frames,
                        malformed: None,
                    }
                }
                FrameParse::Malformed { declared } => {
                    self.buffer.clear();
                    return PushResult {
                        frames,
                        malformed: Some(declared),
                    };
                }
            }
        }
    }

    /// Number of buffered, not-yet-delivered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no pending bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
