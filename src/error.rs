//! Error types for the capture pipeline.

use thiserror::Error;

/// Maximum number of bytes shown in a hex preview.
pub const HEX_PREVIEW_LIMIT: usize = 64;

/// Main error type for all capture/decode operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// I/O error while reading a capture source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Declared frame length outside the valid `[6, 10 MiB]` window.
    ///
    /// The stream is malformed at this offset; the flow buffer is discarded
    /// and capture continues on the next segment.
    #[error("malformed frame length: {declared}")]
    MalformedLength {
        /// Length declared by the 4-byte prefix.
        declared: u32,
    },

    /// No decoder is registered for this type tag.
    #[error("unknown message type {tag}: {preview}")]
    UnknownMessageType {
        /// Raw 15-bit type ordinal from the wire.
        tag: u16,
        /// Capped hex preview of the frame body.
        preview: String,
    },

    /// Frame body is shorter than the declared type's minimum size.
    #[error("{msg_type} body too short ({got} < {needed} bytes): {preview}")]
    ShortPayload {
        /// Name of the message type being decoded.
        msg_type: &'static str,
        /// Minimum body size for this type.
        needed: usize,
        /// Actual body size.
        got: usize,
        /// Capped hex preview of the frame body.
        preview: String,
    },

    /// Zstd decompression of a compressed body failed.
    #[error("zstd decompression failed: {reason}; {preview}")]
    Decompression {
        /// Error reported by the zstd decoder.
        reason: String,
        /// Capped hex preview of the compressed blob.
        preview: String,
    },

    /// Unsupported capture source format (bad pcap magic, unknown link type).
    #[error("capture source error: {0}")]
    Source(String),

    /// A registered handler failed. Caught at the dispatch boundary,
    /// never propagated into the capture loop.
    #[error("handler error: {0}")]
    Handler(String),
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Render a capped hex preview of `data`, noting how many bytes were elided.
pub fn hex_preview(data: &[u8]) -> String {
    let shown = &data[..data.len().min(HEX_PREVIEW_LIMIT)];
    let mut out = String::with_capacity(shown.len() * 2 + 16);
    for b in shown {
        out.push_str(&format!("{b:02x}"));
    }
    if data.len() > HEX_PREVIEW_LIMIT {
        out.push_str(&format!("...(+{}b)", data.len() - HEX_PREVIEW_LIMIT));
    }
    out
}
