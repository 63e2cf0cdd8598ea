//! Error kinds shared across the grid, the framed channel, and the worker.
//!
//! These map directly onto spec §7: `MessageTooLarge`, `Framing`,
//! `Contract`, `Transport`, `Canceled`. The worker never retries or
//! self-restarts on any of them; they all surface to the caller that owns
//! the operation.

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("encoded payload of {len} bytes exceeds the {max:#06x} byte frame limit")]
    MessageTooLarge { len: usize, max: usize },

    #[error("framing error: {0}")]
    Framing(String),

    #[error("contract violation: {0}")]
    Contract(String),

    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    #[error("request canceled")]
    Canceled,
}

impl Error {
    pub(crate) fn contract(msg: impl Into<String>) -> Error {
        Error::Contract(msg.into())
    }

    pub(crate) fn framing(msg: impl Into<String>) -> Error {
        Error::Framing(msg.into())
    }

    /// Classify an I/O failure: a clean short read is a framing problem
    /// (the peer closed mid-message or sent garbage), anything else is a
    /// transport failure (spec §7 distinguishes the two).
    pub(crate) fn from_io(err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Framing(format!("short read: {err}")),
            _ => Error::Transport(err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from_io(err)
    }
}
