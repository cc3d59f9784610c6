//! RADIUS protocol implementation
//!
//! This crate provides the protocol core defined by RFC 2865 and RFC 2866:
//! packet encoding and decoding, a typed attribute dictionary, the
//! Vendor-Specific attribute container, and the MD5 authenticator engine
//! (request/response authenticators and User-Password obfuscation).
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{codec, Attribute, Code, Packet};
//! use radius_proto::packet::codes;
//! use std::net::Ipv4Addr;
//!
//! // Build an Access-Request; the password stays cleartext until encode.
//! let mut request = Packet::access_request("alice", "hunter2").unwrap();
//! request.add_attribute(
//!     Attribute::ipv4(codes::NAS_IP_ADDRESS, Ipv4Addr::new(127, 0, 0, 1)).unwrap(),
//! );
//!
//! // Encoding creates the request authenticator and obfuscates the
//! // User-Password on the wire.
//! let wire = codec::encode_request(&mut request, b"s3cr3t").unwrap();
//! assert_eq!(wire[0], Code::AccessRequest.as_u8());
//! assert_ne!(request.authenticator, [0u8; 16]);
//! ```

pub mod attributes;
pub mod auth;
pub mod codec;
pub mod dictionary;
pub mod error;
pub mod octets;
pub mod packet;

pub use attributes::{Attribute, VendorSpecific, VENDOR_SPECIFIC};
pub use dictionary::{AttributeDefinition, Dictionary, ValueKind};
pub use error::RadiusError;
pub use packet::{codes, next_identifier, Code, Packet};
