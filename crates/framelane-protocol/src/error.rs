//! Errors raised while decoding or encoding protocol messages.

use thiserror::Error;

/// Protocol violations detected in a header or response.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes than a complete header were supplied.
    #[error("header requires {expected} bytes, got {actual}")]
    TruncatedHeader {
        /// Required header length.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },
    /// The magic sentinel did not match.
    #[error("magic {found:#010x} was not found in received data")]
    BadMagic {
        /// Magic value read from the wire.
        found: u32,
    },
    /// The protocol version is not the supported one.
    #[error("unknown protocol version {found}, server uses {supported}")]
    UnsupportedVersion {
        /// Version read from the wire.
        found: u32,
        /// Version this build speaks.
        supported: u32,
    },
    /// The header declared an empty payload.
    #[error("payload size is 0")]
    EmptyPayload,
    /// The header declared more payload than the server accepts.
    #[error("file size is too big ({size}), max size is {max}")]
    PayloadTooLarge {
        /// Declared payload size.
        size: u32,
        /// Configured maximum.
        max: u32,
    },
    /// The header declared a zero frame size.
    #[error("frame size is 0")]
    ZeroFrameSize,
    /// The frame is larger than the whole payload.
    #[error("frame size is too big ({frame_size}), file size is {total_size}")]
    FrameLargerThanPayload {
        /// Declared frame size.
        frame_size: u32,
        /// Declared payload size.
        total_size: u32,
    },
    /// The payload is not a whole number of frames.
    #[error("cannot divide size by frame size ({total_size} % {frame_size} != 0)")]
    UnalignedFrames {
        /// Declared payload size.
        total_size: u32,
        /// Declared frame size.
        frame_size: u32,
    },
    /// A response declared a frame size other than eight bytes.
    #[error("response frame size {found} is not the size of a u64")]
    ResponseFrameSize {
        /// Frame size read from the response header.
        found: u32,
    },
    /// A response payload length disagreed with its header.
    #[error("response declares {declared} payload bytes, got {actual}")]
    ResponseLength {
        /// Payload size declared in the header.
        declared: usize,
        /// Payload bytes actually present.
        actual: usize,
    },
    /// Too many values to describe in a `u32` size field.
    #[error("{values} values do not fit in one response")]
    ResponseTooLarge {
        /// Number of values supplied.
        values: usize,
    },
}
