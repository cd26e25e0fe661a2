//! Fixed-size message header and request validation.

use crate::ProtocolError;

/// Sentinel opening every message.
pub const HEADER_MAGIC: u32 = 0xDEAD_BEEF;

/// The only protocol version this build accepts.
pub const HEADER_VERSION: u32 = 1;

/// Length of the zeroed tail reserved for future header fields.
pub const RESERVED_LEN: usize = 32;

const WORD_LEN: usize = 4;
const FIELDS_LEN: usize = 5 * WORD_LEN;

/// Length of an encoded header in bytes.
pub const HEADER_LEN: usize = FIELDS_LEN + RESERVED_LEN;

/// Header fields as they appear on the wire, in host representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Must equal [`HEADER_MAGIC`].
    pub magic: u32,
    /// Must equal [`HEADER_VERSION`].
    pub version: u32,
    /// Payload length in bytes.
    pub total_size: u32,
    /// Processing granularity in bytes.
    pub frame_size: u32,
    /// Reserved integrity field; carried but never computed.
    pub checksum: u32,
    /// Reserved padding, zero on messages built here.
    pub reserved: [u8; RESERVED_LEN],
}

impl MessageHeader {
    /// Builds a request header for `total_size` bytes split into
    /// `frame_size` frames.
    #[must_use]
    pub const fn request(total_size: u32, frame_size: u32) -> Self {
        Self {
            magic: HEADER_MAGIC,
            version: HEADER_VERSION,
            total_size,
            frame_size,
            checksum: 0,
            reserved: [0; RESERVED_LEN],
        }
    }

    /// Parses the leading [`HEADER_LEN`] bytes without validating them.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::TruncatedHeader`] when fewer than
    /// [`HEADER_LEN`] bytes are supplied.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(ProtocolError::TruncatedHeader {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        };
        let (fields, tail) = header.split_at(FIELDS_LEN);
        let mut words = fields.chunks_exact(WORD_LEN).map(read_word);
        let mut next = || words.next().unwrap_or_default();
        let magic = next();
        let version = next();
        let total_size = next();
        let frame_size = next();
        let checksum = next();
        let mut reserved = [0_u8; RESERVED_LEN];
        reserved.copy_from_slice(tail);
        Ok(Self {
            magic,
            version,
            total_size,
            frame_size,
            checksum,
            reserved,
        })
    }

    /// Serialises the header in network byte order.
    #[expect(clippy::big_endian_bytes, reason = "the wire format is network order")]
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0_u8; HEADER_LEN];
        let fields = [
            self.magic,
            self.version,
            self.total_size,
            self.frame_size,
            self.checksum,
        ];
        for (slot, field) in bytes.chunks_exact_mut(WORD_LEN).zip(fields) {
            slot.copy_from_slice(&field.to_be_bytes());
        }
        if let Some(tail) = bytes.get_mut(FIELDS_LEN..) {
            tail.copy_from_slice(&self.reserved);
        }
        bytes
    }

    /// Checks the magic and version fields shared by requests and responses.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BadMagic`] or
    /// [`ProtocolError::UnsupportedVersion`].
    pub const fn check_identity(&self) -> Result<(), ProtocolError> {
        if self.magic != HEADER_MAGIC {
            return Err(ProtocolError::BadMagic { found: self.magic });
        }
        if self.version != HEADER_VERSION {
            return Err(ProtocolError::UnsupportedVersion {
                found: self.version,
                supported: HEADER_VERSION,
            });
        }
        Ok(())
    }

    /// Validates a request header against `limits`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProtocolError`] found, checking magic, version,
    /// payload size, then the frame relationship.
    pub fn validate(self, limits: HeaderLimits) -> Result<FrameLayout, ProtocolError> {
        self.check_identity()?;
        let total_size = self.total_size;
        let frame_size = self.frame_size;
        if total_size == 0 {
            return Err(ProtocolError::EmptyPayload);
        }
        if total_size > limits.max_total_size {
            return Err(ProtocolError::PayloadTooLarge {
                size: total_size,
                max: limits.max_total_size,
            });
        }
        if frame_size == 0 {
            return Err(ProtocolError::ZeroFrameSize);
        }
        if frame_size > total_size {
            return Err(ProtocolError::FrameLargerThanPayload {
                frame_size,
                total_size,
            });
        }
        if total_size.checked_rem(frame_size) != Some(0) {
            return Err(ProtocolError::UnalignedFrames {
                total_size,
                frame_size,
            });
        }
        Ok(FrameLayout { header: self })
    }
}

#[expect(clippy::big_endian_bytes, reason = "the wire format is network order")]
fn read_word(chunk: &[u8]) -> u32 {
    let mut word = [0_u8; WORD_LEN];
    word.copy_from_slice(chunk);
    u32::from_be_bytes(word)
}

/// Server-side bounds applied while validating a request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLimits {
    max_total_size: u32,
}

impl HeaderLimits {
    /// Builds limits accepting payloads of up to `max_total_size` bytes.
    #[must_use]
    pub const fn new(max_total_size: u32) -> Self {
        Self { max_total_size }
    }

    /// Largest accepted payload in bytes.
    #[must_use]
    pub const fn max_total_size(&self) -> u32 {
        self.max_total_size
    }
}

/// A validated request header: the payload is a non-empty whole number of
/// frames within the configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    header: MessageHeader,
}

impl FrameLayout {
    /// The header this layout was validated from.
    #[must_use]
    pub const fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Payload size in bytes.
    #[must_use]
    pub const fn total_size(&self) -> u32 {
        self.header.total_size
    }

    /// Frame size in bytes.
    #[must_use]
    pub const fn frame_size(&self) -> u32 {
        self.header.frame_size
    }

    /// Payload size as a buffer length.
    #[must_use]
    pub const fn total_len(&self) -> usize {
        self.header.total_size as usize
    }

    /// Frame size as a buffer length.
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        self.header.frame_size as usize
    }

    /// Number of frames in the payload.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        match self.header.total_size.checked_div(self.header.frame_size) {
            Some(count) => count,
            None => 0,
        }
    }
}

/// Parses and validates a request header.
///
/// `bytes` must hold at least one full header; anything after it is ignored.
///
/// # Errors
///
/// Returns a [`ProtocolError`] for a short buffer, a bad magic or version, or
/// an invalid size/frame relationship.
pub fn decode_header(bytes: &[u8], limits: HeaderLimits) -> Result<FrameLayout, ProtocolError> {
    MessageHeader::from_bytes(bytes)?.validate(limits)
}
