use std::io;
use thiserror::Error;

/// Errors raised by the protocol layer.
///
/// Encode-time errors (`AttributeTooLong`, `InvalidValue`, `PasswordTooLong`,
/// `MissingSecret`) surface synchronously to the caller building the packet.
/// Decode-time errors describe why an inbound datagram was rejected.
#[derive(Error, Debug)]
pub enum RadiusError {
    #[error("malformed packet: {0}")]
    MalformedPacket(String),
    #[error("malformed attribute: {0}")]
    MalformedAttribute(String),
    #[error("response authenticator mismatch")]
    AuthenticatorMismatch,
    #[error("response identifier {got} does not match request identifier {expected}")]
    IdentifierMismatch { expected: u8, got: u8 },
    #[error("attribute value too long: {0} bytes (max 253)")]
    AttributeTooLong(usize),
    #[error("packet too large: {0} bytes (max 4096)")]
    PacketTooLarge(usize),
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("duplicate dictionary entry: {0}")]
    DuplicateAttribute(String),
    #[error("attribute {0} occurs more than once")]
    AmbiguousAttribute(String),
    #[error("invalid {kind} value: {value:?}")]
    InvalidValue { kind: &'static str, value: String },
    #[error("password exceeds 128 bytes")]
    PasswordTooLong,
    #[error("shared secret must not be empty")]
    MissingSecret,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
