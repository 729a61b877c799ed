//! Crate-wide error type.

use core::fmt;
use core::result;

#[cfg(feature = "std")]
use std::error;
#[cfg(feature = "std")]
use std::io;

/// The error type exposed by every fallible operation in this crate.
#[derive(Debug)]
pub enum Error {
    /// A bounded read would overshoot the end of the available bytes.
    /// Corresponds to `TruncatedRecord` in the component design.
    BufferTooShort(usize, &'static str),
    /// A magic number, B+ tree header, or other structural invariant did
    /// not hold. Carries a human-readable description.
    Malformed(String),
    /// A `TopicLink` record type outside the documented set.
    UnknownRecordType(u8),
    /// A command byte inside a display record's formatting stream that
    /// is not in the command table.
    UnknownFormattingCommand(u8),
    /// A feature that only makes sense in a specific file variant (e.g.
    /// MVB-only `vfld`/`dtype` tags) was seen outside that variant.
    UnsupportedFeature(String),
    /// Failure reading the underlying file.
    #[cfg(feature = "std")]
    Io(io::Error),
    /// A bounds or context failure from `scroll`.
    Scroll(scroll::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BufferTooShort(size, msg) => {
                write!(f, "Buffer too short: {} ({} bytes needed)", msg, size)
            }
            Error::Malformed(ref msg) => write!(f, "Malformed entity: {}", msg),
            Error::UnknownRecordType(t) => write!(f, "Unknown topic-link record type: {:#x}", t),
            Error::UnknownFormattingCommand(c) => {
                write!(f, "Unknown formatting command byte: {:#x}", c)
            }
            Error::UnsupportedFeature(ref msg) => write!(f, "Unsupported feature: {}", msg),
            #[cfg(feature = "std")]
            Error::Io(ref io) => write!(f, "IO error: {}", io),
            Error::Scroll(ref e) => write!(f, "Scroll error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref io) => Some(io),
            Error::Scroll(ref e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<scroll::Error> for Error {
    fn from(err: scroll::Error) -> Self {
        Error::Scroll(err)
    }
}

/// The result type returned by every fallible operation in this crate.
pub type Result<T> = result::Result<T, Error>;
