//! Request generation.

use framelane_protocol::{HEADER_LEN, MessageHeader};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::cli::RequestArgs;
use crate::errors::CliError;

/// Builds a complete request: header followed by `size` random bytes.
///
/// The header is written as asked even when the sizes would be rejected by
/// a server, so malformed requests can be produced on purpose.
pub(crate) fn build_request(args: RequestArgs) -> Result<Vec<u8>, CliError> {
    let payload_len = usize::try_from(args.size)
        .ok()
        .and_then(|len| len.checked_add(HEADER_LEN))
        .ok_or(CliError::PayloadTooLarge { size: args.size })?;
    let mut request = vec![0_u8; payload_len];
    let header = MessageHeader::request(args.size, args.frame_size).to_bytes();
    let (head, payload) = request.split_at_mut(HEADER_LEN);
    head.copy_from_slice(&header);
    match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed).fill_bytes(payload),
        None => rand::thread_rng().fill_bytes(payload),
    }
    Ok(request)
}
