//! Packet structure: header fields, attribute list, type codes.

mod code;
#[allow(clippy::module_inception)]
mod packet;

pub use code::Code;
pub use packet::{codes, next_identifier, Packet};
