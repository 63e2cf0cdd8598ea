//! The framed message channel used by all three worker endpoints.

mod framing;

pub use framing::{MessageChannel, MAX_PAYLOAD_LEN};
