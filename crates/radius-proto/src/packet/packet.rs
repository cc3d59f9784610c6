use super::Code;
use crate::attributes::{Attribute, VendorSpecific, VENDOR_SPECIFIC};
use crate::error::RadiusError;
use std::sync::atomic::{AtomicU8, Ordering};

/// Process-wide identifier allocator shared by every outbound request.
/// Wraps 255 -> 0; the startup value is not persisted.
static NEXT_IDENTIFIER: AtomicU8 = AtomicU8::new(0);

/// Allocate the next outbound packet identifier.
pub fn next_identifier() -> u8 {
    NEXT_IDENTIFIER.fetch_add(1, Ordering::Relaxed)
}

/// Well-known standard attribute codes used throughout the crate.
pub mod codes {
    pub const USER_NAME: u8 = 1;
    pub const USER_PASSWORD: u8 = 2;
    pub const CHAP_PASSWORD: u8 = 3;
    pub const NAS_IP_ADDRESS: u8 = 4;
    pub const NAS_PORT: u8 = 5;
    pub const SERVICE_TYPE: u8 = 6;
    pub const REPLY_MESSAGE: u8 = 18;
    pub const STATE: u8 = 24;
    pub const CLASS: u8 = 25;
    pub const NAS_IDENTIFIER: u8 = 32;
    pub const PROXY_STATE: u8 = 33;
    pub const ACCT_STATUS_TYPE: u8 = 40;
    pub const ACCT_SESSION_ID: u8 = 44;
}

/// RADIUS packet as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// The authenticator field is managed by the codec: request encoding fills
/// it in, response encoding derives it from the request's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub code: Code,
    pub identifier: u8,
    pub authenticator: [u8; 16],
    pub attributes: Vec<Attribute>,
}

impl Packet {
    /// Header size (1 code + 1 id + 2 length + 16 authenticator).
    pub const HEADER_LENGTH: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes per RFC 2865).
    pub const MAX_LENGTH: usize = 4096;

    pub fn new(code: Code, identifier: u8) -> Self {
        Packet {
            code,
            identifier,
            authenticator: [0u8; 16],
            attributes: Vec::new(),
        }
    }

    /// An Access-Request carrying User-Name and the raw, not yet
    /// obfuscated User-Password. The identifier comes from the global
    /// allocator; the authenticator is created at encode time.
    pub fn access_request(
        user_name: &str,
        password: impl Into<String>,
    ) -> Result<Self, RadiusError> {
        let mut packet = Packet::new(Code::AccessRequest, next_identifier());
        packet.add_attribute(Attribute::string(codes::USER_NAME, user_name)?);
        packet.add_attribute(Attribute::string(codes::USER_PASSWORD, password)?);
        Ok(packet)
    }

    /// An Accounting-Request with the zero-filled authenticator the
    /// accounting digest is computed over.
    pub fn accounting_request() -> Self {
        Packet::new(Code::AccountingRequest, next_identifier())
    }

    /// A reply skeleton: the given code with the request's identifier.
    pub fn reply(code: Code, request: &Packet) -> Self {
        Packet::new(code, request.identifier)
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Append a Vendor-Specific container as a code-26 attribute.
    pub fn add_vendor_specific(&mut self, vsa: &VendorSpecific) -> Result<(), RadiusError> {
        self.add_attribute(vsa.to_attribute()?);
        Ok(())
    }

    /// First attribute with the given type.
    pub fn find_attribute(&self, attr_type: u8) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type == attr_type)
    }

    /// All attributes with the given type, in insertion order.
    pub fn find_all_attributes(&self, attr_type: u8) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.attr_type == attr_type)
            .collect()
    }

    /// Remove every attribute whose type equals the argument, preserving
    /// the order of the rest.
    pub fn remove_attributes(&mut self, attr_type: u8) {
        self.attributes.retain(|a| a.attr_type != attr_type);
    }

    /// Every Vendor-Specific attribute parsed into its container form.
    pub fn vendor_specific(&self) -> Result<Vec<VendorSpecific>, RadiusError> {
        self.find_all_attributes(VENDOR_SPECIFIC)
            .into_iter()
            .map(VendorSpecific::from_attribute)
            .collect()
    }

    /// Length of the encoded packet: header plus attribute TLVs.
    pub fn length(&self) -> usize {
        Self::HEADER_LENGTH
            + self
                .attributes
                .iter()
                .map(Attribute::encoded_length)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_access_request_factory() {
        let packet = Packet::access_request("alice", "hunter2").unwrap();
        assert_eq!(packet.code, Code::AccessRequest);
        assert_eq!(
            packet.find_attribute(codes::USER_NAME).unwrap().value,
            b"alice"
        );
        // Pre-obfuscation cleartext until the codec encodes the packet.
        assert_eq!(
            packet.find_attribute(codes::USER_PASSWORD).unwrap().value,
            b"hunter2"
        );
        assert_eq!(packet.authenticator, [0u8; 16]);
    }

    #[test]
    fn test_accounting_request_factory() {
        let packet = Packet::accounting_request();
        assert_eq!(packet.code, Code::AccountingRequest);
        assert_eq!(packet.authenticator, [0u8; 16]);
    }

    #[test]
    fn test_reply_copies_identifier() {
        let request = Packet::new(Code::AccessRequest, 42);
        let reply = Packet::reply(Code::AccessAccept, &request);
        assert_eq!(reply.identifier, 42);
        assert_eq!(reply.code, Code::AccessAccept);
    }

    #[test]
    fn test_length_empty() {
        let packet = Packet::new(Code::AccessRequest, 0);
        assert_eq!(packet.length(), 20);
    }

    #[test]
    fn test_remove_attributes_preserves_order() {
        let mut packet = Packet::new(Code::AccessRequest, 0);
        packet.add_attribute(Attribute::string(1, "a").unwrap());
        packet.add_attribute(Attribute::string(18, "b").unwrap());
        packet.add_attribute(Attribute::string(1, "c").unwrap());
        packet.add_attribute(Attribute::string(32, "d").unwrap());
        packet.add_attribute(Attribute::string(1, "e").unwrap());

        packet.remove_attributes(1);
        let types: Vec<u8> = packet.attributes.iter().map(|a| a.attr_type).collect();
        assert_eq!(types, [18, 32]);
    }

    #[test]
    fn test_duplicate_types_preserved_in_order() {
        let mut packet = Packet::new(Code::AccessAccept, 0);
        packet.add_attribute(Attribute::octets(codes::PROXY_STATE, b"one".to_vec()).unwrap());
        packet.add_attribute(Attribute::octets(codes::PROXY_STATE, b"two".to_vec()).unwrap());

        let found = packet.find_all_attributes(codes::PROXY_STATE);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, b"one");
        assert_eq!(found[1].value, b"two");
    }

    #[test]
    fn test_identifier_counter_cycles() {
        // 256 successive allocations produce every 8-bit value once.
        let mut seen = HashSet::new();
        for _ in 0..256 {
            seen.insert(next_identifier());
        }
        assert_eq!(seen.len(), 256);
    }
}
