//! Response encoding: one big-endian `u64` per indicator.

use crate::{HEADER_LEN, MessageHeader, ProtocolError};

/// Frame size of every response: the width of one indicator value.
pub const RESPONSE_FRAME_SIZE: u32 = 8;

const VALUE_LEN: usize = RESPONSE_FRAME_SIZE as usize;

/// Serialises indicator values, in registry order, into a complete response.
///
/// # Errors
///
/// Returns [`ProtocolError::ResponseTooLarge`] when the payload length does
/// not fit the header's `u32` size field.
#[expect(clippy::big_endian_bytes, reason = "the wire format is network order")]
pub fn encode_response(values: &[u64]) -> Result<Vec<u8>, ProtocolError> {
    let payload_size = values
        .len()
        .checked_mul(VALUE_LEN)
        .and_then(|size| u32::try_from(size).ok())
        .ok_or(ProtocolError::ResponseTooLarge {
            values: values.len(),
        })?;
    let header = MessageHeader::request(payload_size, RESPONSE_FRAME_SIZE);
    let mut bytes = Vec::with_capacity(HEADER_LEN + values.len() * VALUE_LEN);
    bytes.extend_from_slice(&header.to_bytes());
    for value in values {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    Ok(bytes)
}

/// Parses a complete response back into indicator values.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the header is short or foreign, the frame
/// size is not eight, or the payload length disagrees with the header.
#[expect(clippy::big_endian_bytes, reason = "the wire format is network order")]
pub fn decode_response(bytes: &[u8]) -> Result<Vec<u64>, ProtocolError> {
    let header = MessageHeader::from_bytes(bytes)?;
    header.check_identity()?;
    if header.frame_size != RESPONSE_FRAME_SIZE {
        return Err(ProtocolError::ResponseFrameSize {
            found: header.frame_size,
        });
    }
    let declared = header.total_size as usize;
    let payload = bytes.get(HEADER_LEN..).unwrap_or_default();
    if payload.len() != declared || declared % VALUE_LEN != 0 {
        return Err(ProtocolError::ResponseLength {
            declared,
            actual: payload.len(),
        });
    }
    Ok(payload
        .chunks_exact(VALUE_LEN)
        .map(|chunk| {
            let mut value = [0_u8; VALUE_LEN];
            value.copy_from_slice(chunk);
            u64::from_be_bytes(value)
        })
        .collect())
}
