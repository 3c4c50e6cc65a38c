//! Frame-to-message decoding.
//!
//! One frame in, one typed [`Message`] out. FRAME_DOWN bodies are
//! recursively unpacked with the same length-prefixed framing rule as the
//! live stream, applied to an in-memory blob; a nested frame may itself be
//! a FRAME_DOWN. Decoding is stateless.

use bytes::Bytes;

use crate::error::{hex_preview, CaptureError, Result};
use crate::protocol::{Frame, FrameParse, MessageType, MIN_FRAME_SIZE};

use super::message::{FrameDownBody, Message, MessageBody, NotifyBody};

/// Minimum NOTIFY body: service id (8) + stub id (4) + method id (4).
const NOTIFY_HEADER_SIZE: usize = 16;

/// Minimum FRAME_DOWN body: sequence id (4).
const FRAME_DOWN_HEADER_SIZE: usize = 4;

/// Decode one frame into a typed message.
///
/// # Errors
///
/// - [`CaptureError::UnknownMessageType`] when the type tag has no decode
///   rule (unknown ordinal, or a known ordinal such as BROADCAST that the
///   protocol never ships standalone decode rules for),
/// - [`CaptureError::ShortPayload`] when the body violates the type's
///   minimum size,
/// - [`CaptureError::Decompression`] when a compressed FRAME_DOWN blob
///   fails to decompress (the whole FRAME_DOWN fails, it does not silently
///   yield zero nested messages).
pub fn decode_message(frame: &Frame, is_from_client: bool) -> Result<Message> {
    let msg_type = frame.message_type().ok_or_else(|| CaptureError::UnknownMessageType {
        tag: frame.ordinal(),
        preview: hex_preview(&frame.body),
    })?;

    let body = match msg_type {
        MessageType::Notify => MessageBody::Notify(decode_notify(frame)?),
        MessageType::FrameDown => MessageBody::FrameDown(decode_frame_down(frame, is_from_client)?),
        MessageType::AckFrameDown => MessageBody::AckFrameDown {
            payload: if frame.body.is_empty() {
                None
            } else {
                Some(frame.body.clone())
            },
        },
        // Observed protocol behavior: any body bytes on these types are
        // not interpreted.
        MessageType::Call
        | MessageType::Return
        | MessageType::Echo
        | MessageType::FrameUp
        | MessageType::AckFrameUp => MessageBody::Bare,
        _ => {
            return Err(CaptureError::UnknownMessageType {
                tag: frame.ordinal(),
                preview: hex_preview(&frame.body),
            })
        }
    };

    Ok(Message {
        msg_type,
        is_from_client,
        body,
    })
}

fn decode_notify(frame: &Frame) -> Result<NotifyBody> {
    let body = &frame.body;
    if body.len() < NOTIFY_HEADER_SIZE {
        return Err(CaptureError::ShortPayload {
            msg_type: "Notify",
            needed: NOTIFY_HEADER_SIZE,
            got: body.len(),
            preview: hex_preview(body),
        });
    }

    let service_id = u64::from_be_bytes(body[0..8].try_into().expect("checked length"));
    let stub_id = u32::from_be_bytes(body[8..12].try_into().expect("checked length"));
    let method_id = u32::from_be_bytes(body[12..16].try_into().expect("checked length"));
    let payload = if body.len() > NOTIFY_HEADER_SIZE {
        Some(body.slice(NOTIFY_HEADER_SIZE..))
    } else {
        None
    };

    Ok(NotifyBody {
        service_id,
        stub_id,
        method_id,
        payload,
    })
}

fn decode_frame_down(frame: &Frame, is_from_client: bool) -> Result<FrameDownBody> {
    let body = &frame.body;
    if body.len() < FRAME_DOWN_HEADER_SIZE {
        return Err(CaptureError::ShortPayload {
            msg_type: "FrameDown",
            needed: FRAME_DOWN_HEADER_SIZE,
            got: body.len(),
            preview: hex_preview(body),
        });
    }

    let sequence_id = u32::from_be_bytes(body[0..4].try_into().expect("checked length"));
    let blob = body.slice(FRAME_DOWN_HEADER_SIZE..);

    let blob: Bytes = if frame.is_compressed() {
        Bytes::from(
            zstd::decode_all(&blob[..]).map_err(|e| CaptureError::Decompression {
                reason: e.to_string(),
                preview: hex_preview(&blob),
            })?,
        )
    } else {
        blob
    };

    Ok(FrameDownBody {
        sequence_id,
        nested: unpack_nested(&blob, is_from_client),
    })
}

/// Unpack a nested blob into zero or more decoded messages.
///
/// Walks the blob with the same framing rule as the live stream. A nested
/// frame that fails to decode ends the walk for the remainder of the blob,
/// but messages decoded before it are kept (partial recovery). Truncated
/// or malformed trailing bytes also end the walk silently.
fn unpack_nested(blob: &[u8], is_from_client: bool) -> Vec<Message> {
    let mut nested = Vec::new();
    let mut rest = blob;

    while rest.len() >= MIN_FRAME_SIZE {
        match Frame::parse(rest) {
            FrameParse::Complete { frame, consumed } => {
                match decode_message(&frame, is_from_client) {
                    Ok(msg) => nested.push(msg),
                    Err(e) => {
                        tracing::debug!("nested frame decode ended early: {e}");
                        break;
                    }
                }
                rest = &rest[consumed..];
            }
            FrameParse::NeedMore | FrameParse::Malformed { .. } => break,
        }
    }

    nested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_frame, services};

    fn parse_one(bytes: &[u8]) -> Frame {
        match Frame::parse(bytes) {
            FrameParse::Complete { frame, .. } => frame,
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    fn notify_body(service_id: u64, stub_id: u32, method_id: u32, payload: &[u8]) -> Vec<u8> {
        let mut body = service_id.to_be_bytes().to_vec();
        body.extend_from_slice(&stub_id.to_be_bytes());
        body.extend_from_slice(&method_id.to_be_bytes());
        body.extend_from_slice(payload);
        body
    }

    #[test]
    fn test_notify_with_payload() {
        let body = notify_body(services::WORLD_NTF, 7, 0x15, &[1, 2, 3]);
        let frame = parse_one(&encode_frame(0x0002, &body));

        let msg = decode_message(&frame, false).unwrap();
        assert_eq!(msg.msg_type, MessageType::Notify);
        assert!(!msg.is_from_client);

        let notify = msg.as_notify().unwrap();
        assert_eq!(notify.service_id, services::WORLD_NTF);
        assert_eq!(notify.stub_id, 7);
        assert_eq!(notify.method_id, 0x15);
        assert_eq!(notify.payload.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_notify_exact_header_has_no_payload() {
        let body = notify_body(services::CHIT_CHAT_NTF, 1, 1, &[]);
        let frame = parse_one(&encode_frame(0x0002, &body));

        let msg = decode_message(&frame, true).unwrap();
        assert!(msg.as_notify().unwrap().payload.is_none());
    }

    #[test]
    fn test_notify_too_short() {
        let frame = parse_one(&encode_frame(0x0002, &[0u8; 15]));
        let err = decode_message(&frame, true).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::ShortPayload { msg_type: "Notify", needed: 16, got: 15, .. }
        ));
    }

    #[test]
    fn test_bare_types_discard_body() {
        for raw_tag in [0x0001u16, 0x0003, 0x0004, 0x0005, 0x0007] {
            let frame = parse_one(&encode_frame(raw_tag, b"trailing bytes ignored"));
            let msg = decode_message(&frame, true).unwrap();
            assert!(matches!(msg.body, MessageBody::Bare), "tag {raw_tag:#x}");
        }
    }

    #[test]
    fn test_ack_frame_down_keeps_payload_verbatim() {
        let frame = parse_one(&encode_frame(0x0008, &[0xDE, 0xAD]));
        let msg = decode_message(&frame, false).unwrap();
        match msg.body {
            MessageBody::AckFrameDown { payload } => {
                assert_eq!(payload.as_deref(), Some(&[0xDEu8, 0xAD][..]));
            }
            other => panic!("expected AckFrameDown, got {other:?}"),
        }

        let frame = parse_one(&encode_frame(0x0008, &[]));
        let msg = decode_message(&frame, false).unwrap();
        match msg.body {
            MessageBody::AckFrameDown { payload } => assert!(payload.is_none()),
            other => panic!("expected AckFrameDown, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_ordinal_rejected() {
        let frame = parse_one(&encode_frame(0x0123, b"??"));
        let err = decode_message(&frame, true).unwrap_err();
        assert!(matches!(err, CaptureError::UnknownMessageType { tag: 0x0123, .. }));
    }

    #[test]
    fn test_known_type_without_decode_rule_rejected() {
        // BROADCAST is in the enum but has no standalone decode rule.
        let frame = parse_one(&encode_frame(0x000C, b""));
        let err = decode_message(&frame, true).unwrap_err();
        assert!(matches!(err, CaptureError::UnknownMessageType { tag: 12, .. }));
    }

    fn frame_down_bytes(sequence_id: u32, nested_wire: &[u8], compressed: bool) -> Vec<u8> {
        let mut body = sequence_id.to_be_bytes().to_vec();
        if compressed {
            body.extend_from_slice(&zstd::encode_all(nested_wire, 3).unwrap());
            encode_frame(0x8006, &body)
        } else {
            body.extend_from_slice(nested_wire);
            encode_frame(0x0006, &body)
        }
    }

    #[test]
    fn test_frame_down_empty_blob() {
        let frame = parse_one(&frame_down_bytes(42, &[], false));
        let msg = decode_message(&frame, false).unwrap();
        let fd = msg.as_frame_down().unwrap();
        assert_eq!(fd.sequence_id, 42);
        assert!(fd.nested.is_empty());
    }

    #[test]
    fn test_frame_down_too_short() {
        let frame = parse_one(&encode_frame(0x0006, &[0, 0, 0]));
        let err = decode_message(&frame, false).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::ShortPayload { msg_type: "FrameDown", needed: 4, got: 3, .. }
        ));
    }

    #[test]
    fn test_frame_down_nested_matches_standalone_decode() {
        let echo_wire = encode_frame(0x0004, b"");
        let notify_wire = encode_frame(
            0x0002,
            &notify_body(services::WORLD_NTF, 1, 0x2B, &[9, 9]),
        );
        let mut nested_wire = echo_wire.clone();
        nested_wire.extend_from_slice(&notify_wire);

        let frame = parse_one(&frame_down_bytes(7, &nested_wire, false));
        let msg = decode_message(&frame, false).unwrap();
        let fd = msg.as_frame_down().unwrap();

        assert_eq!(fd.sequence_id, 7);
        assert_eq!(fd.nested.len(), 2);
        assert_eq!(fd.nested[0].msg_type, MessageType::Echo);
        assert_eq!(fd.nested[1].msg_type, MessageType::Notify);

        // Each child is independently equal to its standalone decode.
        let standalone = decode_message(&parse_one(&notify_wire), false).unwrap();
        let nested_notify = fd.nested[1].as_notify().unwrap();
        let standalone_notify = standalone.as_notify().unwrap();
        assert_eq!(nested_notify.service_id, standalone_notify.service_id);
        assert_eq!(nested_notify.method_id, standalone_notify.method_id);
        assert_eq!(nested_notify.payload, standalone_notify.payload);
        // Children inherit the outer frame's direction.
        assert!(!fd.nested[1].is_from_client);
    }

    #[test]
    fn test_frame_down_compressed_blob() {
        let mut nested_wire = encode_frame(0x0004, b"");
        nested_wire.extend_from_slice(&encode_frame(
            0x0002,
            &notify_body(services::CHIT_CHAT_NTF, 2, 1, b"chat"),
        ));

        let frame = parse_one(&frame_down_bytes(99, &nested_wire, true));
        let msg = decode_message(&frame, false).unwrap();
        let fd = msg.as_frame_down().unwrap();

        assert_eq!(fd.sequence_id, 99);
        assert_eq!(fd.nested.len(), 2);
        assert_eq!(
            fd.nested[1].as_notify().unwrap().payload.as_deref(),
            Some(&b"chat"[..])
        );
    }

    #[test]
    fn test_frame_down_decompression_failure_fails_whole_frame() {
        let mut body = 1u32.to_be_bytes().to_vec();
        body.extend_from_slice(b"definitely not zstd");
        let frame = parse_one(&encode_frame(0x8006, &body));

        let err = decode_message(&frame, false).unwrap_err();
        assert!(matches!(err, CaptureError::Decompression { .. }));
    }

    #[test]
    fn test_frame_down_recursive_nesting() {
        let inner_echo = encode_frame(0x0004, b"");
        let inner_frame_down = frame_down_bytes(2, &inner_echo, false);
        let frame = parse_one(&frame_down_bytes(1, &inner_frame_down, false));

        let msg = decode_message(&frame, false).unwrap();
        let outer = msg.as_frame_down().unwrap();
        assert_eq!(outer.nested.len(), 1);
        let inner = outer.nested[0].as_frame_down().unwrap();
        assert_eq!(inner.sequence_id, 2);
        assert_eq!(inner.nested.len(), 1);
        assert_eq!(inner.nested[0].msg_type, MessageType::Echo);
    }

    #[test]
    fn test_frame_down_partial_recovery_on_bad_nested_frame() {
        // One good echo, then a nested frame with an unknown ordinal.
        let mut nested_wire = encode_frame(0x0004, b"");
        nested_wire.extend_from_slice(&encode_frame(0x0123, b"bad"));
        nested_wire.extend_from_slice(&encode_frame(0x0004, b""));

        let frame = parse_one(&frame_down_bytes(3, &nested_wire, false));
        let msg = decode_message(&frame, false).unwrap();
        let fd = msg.as_frame_down().unwrap();

        // The bad child ends the walk; the good prefix survives, the
        // trailing echo after it is lost.
        assert_eq!(fd.nested.len(), 1);
        assert_eq!(fd.nested[0].msg_type, MessageType::Echo);
    }

    #[test]
    fn test_frame_down_truncated_tail_ignored() {
        let mut nested_wire = encode_frame(0x0004, b"");
        // Declares 20 bytes but only 8 follow.
        nested_wire.extend_from_slice(&20u32.to_be_bytes());
        nested_wire.extend_from_slice(&[0u8; 4]);

        let frame = parse_one(&frame_down_bytes(5, &nested_wire, false));
        let msg = decode_message(&frame, false).unwrap();
        assert_eq!(msg.as_frame_down().unwrap().nested.len(), 1);
    }

    #[test]
    fn test_compression_flag_ignored_for_other_types() {
        // A NOTIFY with the compressed bit set is decoded without
        // decompression; only FRAME_DOWN honors the flag.
        let body = notify_body(services::WORLD_NTF, 1, 6, b"raw");
        let frame = parse_one(&encode_frame(0x8002, &body));

        let msg = decode_message(&frame, false).unwrap();
        assert_eq!(msg.as_notify().unwrap().payload.as_deref(), Some(&b"raw"[..]));
    }
}
