use thiserror::Error;

/// Errors raised while encoding a payload into a symbol. Encoding is
/// deterministic: the same input always fails the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The payload is empty.
    #[error("empty data")]
    InvalidInput,

    /// The encoded payload does not fit in the largest available symbol.
    #[error("capacity exceeded: {needed} codewords needed, {capacity} available")]
    CapacityExceeded { needed: usize, capacity: usize },

    /// A byte cannot be represented in the active encodation mode.
    #[error("byte 0x{byte:02X} cannot be encoded in {mode} mode")]
    UnencodableCharacter { byte: u8, mode: &'static str },

    /// A caller supplied option is malformed (macro block field, aspect ratio,
    /// row height).
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
