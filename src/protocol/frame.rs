//! Frame struct and the length-prefixed parse step.
//!
//! [`Frame::parse`] is the single framing rule shared by the live
//! reassembly buffer and the in-memory nested-blob unpacking in the
//! decoder. It reports its outcome as an explicit three-way result
//! instead of driving control flow through errors.

use bytes::Bytes;

use super::wire::{
    COMPRESSION_FLAG, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE, MESSAGE_TYPE_MASK, MIN_FRAME_SIZE,
    MessageType,
};

/// A complete protocol frame: type/flags field plus body.
///
/// The body is everything after the 6-byte prefix (may be empty).
/// Uses `bytes::Bytes` for zero-copy payload sharing.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw type/flags field: bit 15 = compressed, bits 0-14 = type ordinal.
    pub raw_tag: u16,
    /// Frame body (declared length minus the 6-byte prefix).
    pub body: Bytes,
}

/// Outcome of attempting to split one frame off the head of a buffer.
#[derive(Debug)]
pub enum FrameParse {
    /// A full frame was present; `consumed` bytes belong to it.
    Complete {
        /// The extracted frame.
        frame: Frame,
        /// Exact number of bytes the frame occupied on the wire.
        consumed: usize,
    },
    /// Fewer bytes are buffered than the frame needs. Not an error,
    /// just a wait condition.
    NeedMore,
    /// The declared length is outside `[6, 10 MiB]`; the stream is
    /// malformed at this offset.
    Malformed {
        /// The out-of-range declared length.
        declared: u32,
    },
}

impl Frame {
    /// Create a frame from its raw tag and body bytes.
    pub fn new(raw_tag: u16, body: Bytes) -> Self {
        Self { raw_tag, body }
    }

    /// Try to split one frame off the head of `buf`.
    ///
    /// Extraction is exact: a `Complete` result consumes precisely the
    /// declared length, leaving the remainder untouched for the caller.
    pub fn parse(buf: &[u8]) -> FrameParse {
        if buf.len() < LENGTH_PREFIX_SIZE {
            return FrameParse::NeedMore;
        }
        let declared = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if declared < MIN_FRAME_SIZE as u32 || declared > MAX_FRAME_SIZE {
            return FrameParse::Malformed { declared };
        }
        let total = declared as usize;
        if buf.len() < total {
            return FrameParse::NeedMore;
        }
        let raw_tag = u16::from_be_bytes([buf[4], buf[5]]);
        let body = Bytes::copy_from_slice(&buf[MIN_FRAME_SIZE..total]);
        FrameParse::Complete {
            frame: Frame { raw_tag, body },
            consumed: total,
        }
    }

    /// Whether the compression flag (bit 15) is set.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.raw_tag & COMPRESSION_FLAG != 0
    }

    /// The 15-bit type ordinal, flag stripped.
    #[inline]
    pub fn ordinal(&self) -> u16 {
        self.raw_tag & MESSAGE_TYPE_MASK
    }

    /// The known message type, if the ordinal maps to one.
    #[inline]
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_ordinal(self.ordinal())
    }

    /// Total on-wire length of this frame, prefix included.
    #[inline]
    pub fn total_len(&self) -> usize {
        MIN_FRAME_SIZE + self.body.len()
    }
}

/// Build the wire bytes for a frame: 4-byte BE length (including itself),
/// 2-byte BE type/flags, body.
pub fn encode_frame(raw_tag: u16, body: &[u8]) -> Vec<u8> {
    let total = (MIN_FRAME_SIZE + body.len()) as u32;
    let mut buf = Vec::with_capacity(total as usize);
    buf.extend_from_slice(&total.to_be_bytes());
    buf.extend_from_slice(&raw_tag.to_be_bytes());
    buf.extend_from_slice(body);
    buf
}
