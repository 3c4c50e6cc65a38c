//! Wire format constants and the message type enumeration.
//!
//! Every PDU on the wire is a length-delimited frame:
//! ```text
//! ┌────────────┬─────────────┬──────────────────────┐
//! │ Length     │ Type+Flags  │ Body                 │
//! │ 4 bytes    │ 2 bytes     │ length - 6 bytes     │
//! │ uint32 BE  │ uint16 BE   │                      │
//! └────────────┴─────────────┴──────────────────────┘
//! ```
//!
//! The length field includes itself. Bit 15 of the type field is the
//! compression flag; bits 0-14 are the [`MessageType`] ordinal.

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Minimum viable frame size: length prefix + type/flags field.
pub const MIN_FRAME_SIZE: usize = 6;

/// Maximum accepted frame size (10 MiB). Larger declared lengths are
/// rejected as malformed, not buffered.
pub const MAX_FRAME_SIZE: u32 = 10 * 1024 * 1024;

/// High bit of the type/flags field marks a zstd-compressed body.
pub const COMPRESSION_FLAG: u16 = 0x8000;

/// Low 15 bits of the type/flags field carry the message type ordinal.
pub const MESSAGE_TYPE_MASK: u16 = 0x7FFF;

/// Top-level message kinds of the protocol.
///
/// This is a closed enumeration; ordinals outside 0-14 are retained as raw
/// integers on the frame rather than coerced into the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    /// Placeholder ordinal, never decoded.
    None = 0,
    /// Service method call (client to server).
    Call = 1,
    /// One-way service-method invocation.
    Notify = 2,
    /// Call response.
    Return = 3,
    /// Keepalive echo.
    Echo = 4,
    /// Upstream frame aggregate.
    FrameUp = 5,
    /// Downstream frame aggregate carrying nested messages.
    FrameDown = 6,
    /// Acknowledgement of an upstream frame.
    AckFrameUp = 7,
    /// Acknowledgement of a downstream frame.
    AckFrameDown = 8,
    /// Frame rewind request.
    RewindFrame = 9,
    /// Inner call, seen only inside frame aggregates.
    CallInner = 10,
    /// Inner notify, seen only inside frame aggregates.
    NotifyInner = 11,
    /// Broadcast to all sessions.
    Broadcast = 12,
    /// Broadcast to a session subset.
    BroadcastBySession = 13,
    /// Session termination.
    Terminate = 14,
}

impl MessageType {
    /// Map a wire ordinal to a known message type.
    pub fn from_ordinal(ordinal: u16) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::Call),
            2 => Some(Self::Notify),
            3 => Some(Self::Return),
            4 => Some(Self::Echo),
            5 => Some(Self::FrameUp),
            6 => Some(Self::FrameDown),
            7 => Some(Self::AckFrameUp),
            8 => Some(Self::AckFrameDown),
            9 => Some(Self::RewindFrame),
            10 => Some(Self::CallInner),
            11 => Some(Self::NotifyInner),
            12 => Some(Self::Broadcast),
            13 => Some(Self::BroadcastBySession),
            14 => Some(Self::Terminate),
            _ => None,
        }
    }

    /// Wire ordinal of this type.
    #[inline]
    pub fn ordinal(self) -> u16 {
        self as u16
    }

    /// Upper-snake protocol name, as it appears in traffic dumps.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Call => "CALL",
            Self::Notify => "NOTIFY",
            Self::Return => "RETURN",
            Self::Echo => "ECHO",
            Self::FrameUp => "FRAME_UP",
            Self::FrameDown => "FRAME_DOWN",
            Self::AckFrameUp => "ACK_FRAME_UP",
            Self::AckFrameDown => "ACK_FRAME_DOWN",
            Self::RewindFrame => "REWIND_FRAME",
            Self::CallInner => "CALL_INNER",
            Self::NotifyInner => "NOTIFY_INNER",
            Self::Broadcast => "BROADCAST",
            Self::BroadcastBySession => "BROADCAST_BY_SESSION",
            Self::Terminate => "TERMINATE",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Known service identifiers and method ids.
pub mod services {
    /// World notification service.
    pub const WORLD_NTF: u64 = 0x0000_0000_6333_5342;
    /// Chat notification service.
    pub const CHIT_CHAT_NTF: u64 = 0x0000_0000_09D4_A768;

    /// WORLD_NTF service signature as it appears on the wire (8 bytes BE).
    pub const WORLD_NTF_SIGNATURE: [u8; 8] = WORLD_NTF.to_be_bytes();

    /// Method ids of the WORLD_NTF service.
    pub mod world_ntf {
        /// Nearby entity synchronization.
        pub const SYNC_NEAR_ENTITIES: u32 = 0x0000_0006;
        /// Full container data push.
        pub const SYNC_CONTAINER_DATA: u32 = 0x0000_0015;
        /// Dirty container data push.
        pub const SYNC_CONTAINER_DIRTY_DATA: u32 = 0x0000_0016;
        /// Server clock synchronization.
        pub const SYNC_SERVER_TIME: u32 = 0x0000_002B;
        /// Nearby delta updates.
        pub const SYNC_NEAR_DELTA_INFO: u32 = 0x0000_002D;
        /// Deltas targeted at the local player.
        pub const SYNC_TO_ME_DELTA_INFO: u32 = 0x0000_002E;
    }

    /// Method ids of the CHIT_CHAT_NTF service.
    pub mod chit_chat_ntf {
        /// Push of the newest chat messages.
        pub const NOTIFY_NEWEST_CHIT_CHAT_MSGS: u32 = 0x0000_0001;
    }

    /// Chat channel names keyed by the wire channel-type ordinal.
    pub fn chat_channel_name(channel_type: u32) -> &'static str {
        match channel_type {
            0 => "Unknown",
            1 => "World",
            2 => "Current",
            3 => "Team",
            4 => "Guild",
            5 => "Private",
            6 => "Group",
            7 => "TopNotice",
            99 => "System",
            _ => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_roundtrip() {
        for ordinal in 0u16..=14 {
            let ty = MessageType::from_ordinal(ordinal).unwrap();
            assert_eq!(ty.ordinal(), ordinal);
        }
    }

    #[test]
    fn test_unknown_ordinals_stay_raw() {
        assert!(MessageType::from_ordinal(15).is_none());
        assert!(MessageType::from_ordinal(0x7FFF).is_none());
    }

    #[test]
    fn test_names() {
        assert_eq!(MessageType::Notify.name(), "NOTIFY");
        assert_eq!(MessageType::FrameDown.name(), "FRAME_DOWN");
        assert_eq!(MessageType::BroadcastBySession.to_string(), "BROADCAST_BY_SESSION");
    }

    #[test]
    fn test_world_ntf_signature_bytes() {
        assert_eq!(
            services::WORLD_NTF_SIGNATURE,
            [0x00, 0x00, 0x00, 0x00, 0x63, 0x33, 0x53, 0x42]
        );
    }

    #[test]
    fn test_flag_and_mask_disjoint() {
        assert_eq!(COMPRESSION_FLAG & MESSAGE_TYPE_MASK, 0);
        assert_eq!(COMPRESSION_FLAG | MESSAGE_TYPE_MASK, 0xFFFF);
    }

    #[test]
    fn test_chat_channel_names() {
        assert_eq!(services::chat_channel_name(1), "World");
        assert_eq!(services::chat_channel_name(99), "System");
        assert_eq!(services::chat_channel_name(42), "UNKNOWN");
    }
}
