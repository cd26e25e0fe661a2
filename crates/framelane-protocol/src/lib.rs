//! Wire format shared by the framelane server and its clients.
//!
//! Every message starts with a fixed 52-byte header: five network-order `u32`
//! fields (`magic`, `version`, `total_size`, `frame_size`, `checksum`)
//! followed by 32 reserved bytes. A request carries `total_size` payload bytes
//! that the server consumes in `frame_size` chunks; a response carries one
//! big-endian `u64` per indicator with `frame_size = 8`.
//!
//! The `checksum` field is reserved. It is transmitted and preserved but never
//! computed or verified.

mod error;
mod header;
mod response;

pub use self::error::ProtocolError;
pub use self::header::{
    FrameLayout, HEADER_LEN, HEADER_MAGIC, HEADER_VERSION, HeaderLimits, MessageHeader,
    RESERVED_LEN, decode_header,
};
pub use self::response::{RESPONSE_FRAME_SIZE, decode_response, encode_response};
