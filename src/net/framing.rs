//! Length-prefixed JSON framing over a reliable byte stream (spec §4.2/§6).
//!
//! Every message is a 4-character lowercase hex length prefix followed by
//! that many bytes of JSON. Grounded directly on the `Connection`/
//! `StreamSerializer` pair in the original Python prototype: same prefix
//! width, same "reject up front if the length doesn't fit" behavior, same
//! "one channel wraps one stream, used for one logical request" shape.

use crate::error::{Error, Result};
use serde_json::Value;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};

/// ASCII hex digits used for the length prefix.
const LEN_PREFIX_DIGITS: usize = 4;
/// Largest payload `send` will emit; see spec §4.2.
pub const MAX_PAYLOAD_LEN: usize = 0xFFFF;

/// A framed message channel layered on top of a single [`TcpStream`].
pub struct MessageChannel {
    stream: TcpStream,
}

impl MessageChannel {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Encode `value` as compact JSON and write it as one length-prefixed
    /// frame. Fails with [`Error::MessageTooLarge`] if the encoded payload
    /// would overflow the 4-hex-digit length prefix.
    pub fn send(&mut self, value: &Value) -> Result<()> {
        let payload = serde_json::to_vec(value)
            .map_err(|e| Error::framing(format!("value is not encodable: {e}")))?;

        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Error::MessageTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        let prefix = format!("{:0width$x}", payload.len(), width = LEN_PREFIX_DIGITS);
        self.stream.write_all(prefix.as_bytes())?;
        self.stream.write_all(&payload)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read exactly one length-prefixed frame and decode its JSON payload.
    pub fn recv(&mut self) -> Result<Value> {
        let mut prefix = [0u8; LEN_PREFIX_DIGITS];
        self.read_exact_mapped(&mut prefix)?;

        let prefix = std::str::from_utf8(&prefix)
            .map_err(|_| Error::framing("length prefix is not valid UTF-8"))?;
        let len = usize::from_str_radix(prefix, 16)
            .map_err(|e| Error::framing(format!("length prefix {prefix:?} is not hex: {e}")))?;

        let mut payload = vec![0u8; len];
        self.read_exact_mapped(&mut payload)?;

        serde_json::from_slice(&payload)
            .map_err(|e| Error::framing(format!("payload is not valid JSON: {e}")))
    }

    /// Idempotent close: shuts down both halves of the stream and ignores
    /// the case where it is already closed.
    pub fn close(&mut self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(Error::from_io(e)),
        }
    }

    fn read_exact_mapped(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf).map_err(Error::from_io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use std::thread;

    fn paired_channels() -> (MessageChannel, MessageChannel) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || listener.accept().unwrap().0);
        let client = TcpStream::connect(addr).unwrap();
        let server = server.join().unwrap();
        (MessageChannel::new(client), MessageChannel::new(server))
    }

    #[test]
    fn roundtrips_arbitrary_values() {
        let (mut a, mut b) = paired_channels();
        for value in [
            Value::Null,
            json!(0),
            json!(42),
            json!("hello"),
            json!([1, 2, 3]),
            json!({"UP": [1, 2, 3]}),
        ] {
            a.send(&value).unwrap();
            assert_eq!(b.recv().unwrap(), value);
        }
    }

    #[test]
    fn rejects_oversized_payloads() {
        let (mut a, _b) = paired_channels();
        let huge = Value::String("d".repeat(MAX_PAYLOAD_LEN + 1));
        let err = a.send(&huge).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { .. }));
    }

    #[test]
    fn accepts_payload_at_exact_limit() {
        // json string of length N encodes to N + 2 (quotes) bytes, so size
        // the string so the quoted payload lands exactly at the limit.
        let (mut a, mut b) = paired_channels();
        let value = Value::String("d".repeat(MAX_PAYLOAD_LEN - 2));
        a.send(&value).unwrap();
        assert_eq!(b.recv().unwrap(), value);
    }

    #[test]
    fn short_read_is_a_framing_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let writer = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"00").unwrap();
            drop(stream);
        });
        let (stream, _) = listener.accept().unwrap();
        let mut channel = MessageChannel::new(stream);
        let err = channel.recv().unwrap_err();
        assert!(matches!(err, Error::Framing(_)));
        writer.join().unwrap();
    }

    #[test]
    fn malformed_hex_length_is_a_framing_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let writer = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"zzzz").unwrap();
        });
        let (stream, _) = listener.accept().unwrap();
        let mut channel = MessageChannel::new(stream);
        let err = channel.recv().unwrap_err();
        assert!(matches!(err, Error::Framing(_)));
        writer.join().unwrap();
    }

    #[test]
    fn close_is_idempotent() {
        let (mut a, _b) = paired_channels();
        a.close().unwrap();
        a.close().unwrap();
    }
}
