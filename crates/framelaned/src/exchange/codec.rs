//! Header reads and response writes over a connection.

use std::io::{Read, Write};

use framelane_protocol::{FrameLayout, HEADER_LEN, HeaderLimits, decode_header, encode_response};

use super::{ExchangeError, InternalError, TransportError};

/// Reads exactly one header and validates it. No payload byte is consumed.
pub(crate) fn read_header<S: Read>(
    stream: &mut S,
    limits: HeaderLimits,
) -> Result<FrameLayout, ExchangeError> {
    let mut bytes = [0_u8; HEADER_LEN];
    stream
        .read_exact(&mut bytes)
        .map_err(|source| TransportError::Header { source })?;
    Ok(decode_header(&bytes, limits)?)
}

/// Writes the whole response or fails; a short write surfaces as
/// [`TransportError::Write`].
pub(crate) fn write_response<S: Write>(stream: &mut S, values: &[u64]) -> Result<(), ExchangeError> {
    let bytes = encode_response(values).map_err(InternalError::Encode)?;
    stream
        .write_all(&bytes)
        .and_then(|()| stream.flush())
        .map_err(|source| TransportError::Write { source })?;
    Ok(())
}
