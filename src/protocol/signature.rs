//! Heuristic classification of ambiguous TCP payloads.
//!
//! The capture filter matches all TCP traffic except DNS, so flows that
//! have nothing to do with the game share the pipeline's input. Before a
//! flow gets a reassembly buffer, its first payload is checked here: a
//! cheap length/type sanity check plus a scan for the WORLD_NTF service
//! signature inside the nested sub-message structure.
//!
//! This is a heuristic, not a parser. False negatives silently ignore
//! traffic; false positives are rare because the 8-byte signature is
//! effectively unique within the scanned window.

use super::frame::{Frame, FrameParse};
use super::wire::{services::WORLD_NTF_SIGNATURE, MessageType};

/// Bytes of lower-layer framing skipped before the sub-message scan.
const TRANSPORT_PREFIX_LEN: usize = 10;

/// Offset of the service id inside a sub-message (skips a 2-byte type tag).
const SUB_SERVICE_ID_OFFSET: usize = 2;

/// Scan `buf` for the WORLD_NTF service signature.
///
/// Skips a fixed 10-byte prefix, then walks length-prefixed sub-messages:
/// read a 4-byte BE sub-length, consume `sub_length - 4` bytes, and compare
/// bytes `[2..10]` of the sub-message against the 8-byte BE WORLD_NTF
/// service id. Returns true on the first match; returns false (never
/// errors) when the buffer is exhausted, a sub-length is under 4, or a
/// sub-length would overrun the remaining bytes.
pub fn looks_like_protocol(buf: &[u8]) -> bool {
    if buf.len() <= TRANSPORT_PREFIX_LEN {
        return false;
    }
    let mut rest = &buf[TRANSPORT_PREFIX_LEN..];

    loop {
        if rest.len() < 4 {
            return false;
        }
        let sub_len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let Some(body_len) = sub_len.checked_sub(4) else {
            // Sub-length smaller than its own prefix: malformed, not ours.
            return false;
        };
        rest = &rest[4..];
        if rest.len() < body_len {
            return false;
        }
        let sub_msg = &rest[..body_len];
        rest = &rest[body_len..];

        if sub_msg.len() >= SUB_SERVICE_ID_OFFSET + WORLD_NTF_SIGNATURE.len()
            && sub_msg[SUB_SERVICE_ID_OFFSET..SUB_SERVICE_ID_OFFSET + WORLD_NTF_SIGNATURE.len()]
                == WORLD_NTF_SIGNATURE
        {
            return true;
        }
    }
}

/// Decide whether a reassembled payload is game-protocol traffic.
///
/// Requires a complete, sanely-sized frame at offset 0, then accepts on
/// either the signature scan or a known message-type ordinal in the tag
/// field. Used once per flow at the transport-classification boundary,
/// not inside the decoder.
pub fn is_game_payload(buf: &[u8]) -> bool {
    match Frame::parse(buf) {
        FrameParse::Complete { frame, .. } => {
            looks_like_protocol(buf) || MessageType::from_ordinal(frame.ordinal()).is_some()
        }
        _ => false,
    }
}
