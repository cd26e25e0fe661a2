//! Minimal blocking client used to drive exchanges over loopback TCP.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use framelane_protocol::{MessageHeader, decode_response};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).expect("connect to server");
    stream
        .set_read_timeout(Some(CLIENT_TIMEOUT))
        .expect("set read timeout");
    stream
}

/// Payload whose bytes encode their own offset.
fn payload(len: u32) -> Vec<u8> {
    (0..len).map(|offset| (offset % 251) as u8).collect()
}

/// Reads until the server closes; `None` when nothing decodable arrived.
fn read_response(stream: &mut TcpStream) -> Option<Vec<u64>> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).ok()?;
    if bytes.is_empty() {
        return None;
    }
    decode_response(&bytes).ok()
}

/// Sends a complete request and returns the decoded response.
pub fn send_request(addr: SocketAddr, total_size: u32, frame_size: u32) -> Option<Vec<u64>> {
    send_partial(addr, total_size, frame_size, total_size)
}

/// Declares `total_size` bytes but sends only `sent` of them, then waits for
/// the server to answer or hang up.
pub fn send_partial(
    addr: SocketAddr,
    total_size: u32,
    frame_size: u32,
    sent: u32,
) -> Option<Vec<u64>> {
    let mut stream = connect(addr);
    let mut request = MessageHeader::request(total_size, frame_size).to_bytes().to_vec();
    request.extend(payload(sent));
    stream.write_all(&request).expect("write request");
    read_response(&mut stream)
}

/// Sends only a header and waits for the server to answer or hang up.
pub fn declare_only(addr: SocketAddr, total_size: u32, frame_size: u32) -> Option<Vec<u64>> {
    send_partial(addr, total_size, frame_size, 0)
}
