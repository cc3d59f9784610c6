use crate::dictionary::{AttributeDefinition, ValueKind};
use crate::error::RadiusError;
use std::net::Ipv4Addr;

/// RADIUS attribute TLV as defined in RFC 2865 Section 5
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |  Value ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `vendor_id` is `None` for top-level attributes; sub-attributes carried
/// inside a Vendor-Specific container hold the container's vendor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attr_type: u8,
    pub vendor_id: Option<u32>,
    pub value: Vec<u8>,
}

impl Attribute {
    /// Type + length fields (2 bytes).
    pub const HEADER_LENGTH: usize = 2;
    /// Maximum serialized length including the header.
    pub const MAX_LENGTH: usize = 255;
    /// Maximum value length.
    pub const MAX_VALUE_LENGTH: usize = 253;

    pub fn new(attr_type: u8, value: Vec<u8>) -> Result<Self, RadiusError> {
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(RadiusError::AttributeTooLong(value.len()));
        }
        Ok(Attribute {
            attr_type,
            vendor_id: None,
            value,
        })
    }

    /// A sub-attribute belonging to a vendor space.
    pub fn vendor(vendor_id: u32, attr_type: u8, value: Vec<u8>) -> Result<Self, RadiusError> {
        let mut attribute = Attribute::new(attr_type, value)?;
        attribute.vendor_id = Some(vendor_id);
        Ok(attribute)
    }

    /// A text attribute. Empty strings are rejected per the `string`
    /// value-kind contract.
    pub fn string(attr_type: u8, value: impl Into<String>) -> Result<Self, RadiusError> {
        let value = value.into();
        if value.is_empty() {
            return Err(RadiusError::InvalidValue {
                kind: "string",
                value,
            });
        }
        Self::new(attr_type, value.into_bytes())
    }

    /// A 32-bit unsigned integer attribute, network byte order.
    pub fn integer(attr_type: u8, value: u32) -> Result<Self, RadiusError> {
        Self::new(attr_type, value.to_be_bytes().to_vec())
    }

    /// An IPv4 address attribute.
    pub fn ipv4(attr_type: u8, value: Ipv4Addr) -> Result<Self, RadiusError> {
        Self::new(attr_type, value.octets().to_vec())
    }

    /// An opaque octets attribute.
    pub fn octets(attr_type: u8, value: Vec<u8>) -> Result<Self, RadiusError> {
        Self::new(attr_type, value)
    }

    /// Build an attribute from its display form, parsed per the
    /// dictionary definition's value kind. Named integer aliases resolve
    /// through the definition.
    pub fn from_text(definition: &AttributeDefinition, text: &str) -> Result<Self, RadiusError> {
        let value = match definition.kind {
            ValueKind::Text => {
                if text.is_empty() {
                    return Err(RadiusError::InvalidValue {
                        kind: "string",
                        value: text.to_string(),
                    });
                }
                text.as_bytes().to_vec()
            }
            ValueKind::Integer => {
                let number = match definition.value_by_name(text) {
                    Some(alias) => alias,
                    None => text.parse::<u32>().map_err(|_| RadiusError::InvalidValue {
                        kind: "integer",
                        value: text.to_string(),
                    })?,
                };
                number.to_be_bytes().to_vec()
            }
            ValueKind::Ipv4 => {
                let addr: Ipv4Addr = text.parse().map_err(|_| RadiusError::InvalidValue {
                    kind: "ipaddr",
                    value: text.to_string(),
                })?;
                addr.octets().to_vec()
            }
            ValueKind::Octets => decode_hex(text).ok_or_else(|| RadiusError::InvalidValue {
                kind: "octets",
                value: text.to_string(),
            })?,
        };

        let mut attribute = Attribute::new(definition.code, value)?;
        attribute.vendor_id = definition.vendor_id;
        Ok(attribute)
    }

    /// Render the value per the definition's kind: UTF-8 for text, the
    /// registered alias (or decimal) for integers, dotted-quad for ipaddr,
    /// lowercase hex for octets.
    pub fn display_value(&self, definition: &AttributeDefinition) -> Result<String, RadiusError> {
        match definition.kind {
            ValueKind::Text => self.as_string(),
            ValueKind::Integer => {
                let number = self.as_integer()?;
                Ok(match definition.value_name(number) {
                    Some(alias) => alias.to_string(),
                    None => number.to_string(),
                })
            }
            ValueKind::Ipv4 => Ok(self.as_ipv4()?.to_string()),
            ValueKind::Octets => Ok(encode_hex(&self.value)),
        }
    }

    /// Serialize to TLV bytes.
    pub fn encode(&self) -> Vec<u8> {
        let length = self.encoded_length();
        let mut buffer = Vec::with_capacity(length);
        buffer.push(self.attr_type);
        buffer.push(length as u8);
        buffer.extend_from_slice(&self.value);
        buffer
    }

    /// Decode one TLV from the front of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, RadiusError> {
        if data.len() < Self::HEADER_LENGTH {
            return Err(RadiusError::MalformedAttribute(format!(
                "truncated attribute: {} bytes",
                data.len()
            )));
        }

        let attr_type = data[0];
        let length = data[1] as usize;
        if length < Self::HEADER_LENGTH {
            return Err(RadiusError::MalformedAttribute(format!(
                "attribute length {} below minimum",
                length
            )));
        }
        if data.len() < length {
            return Err(RadiusError::MalformedAttribute(format!(
                "attribute length {} exceeds remaining {} bytes",
                length,
                data.len()
            )));
        }

        Ok(Attribute {
            attr_type,
            vendor_id: None,
            value: data[Self::HEADER_LENGTH..length].to_vec(),
        })
    }

    pub fn encoded_length(&self) -> usize {
        Self::HEADER_LENGTH + self.value.len()
    }

    pub fn as_string(&self) -> Result<String, RadiusError> {
        String::from_utf8(self.value.clone())
            .map_err(|_| RadiusError::MalformedAttribute("value is not valid UTF-8".to_string()))
    }

    pub fn as_integer(&self) -> Result<u32, RadiusError> {
        let bytes: [u8; 4] = self.value.as_slice().try_into().map_err(|_| {
            RadiusError::MalformedAttribute(format!(
                "expected 4 bytes for integer, got {}",
                self.value.len()
            ))
        })?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn as_ipv4(&self) -> Result<Ipv4Addr, RadiusError> {
        let bytes: [u8; 4] = self.value.as_slice().try_into().map_err(|_| {
            RadiusError::MalformedAttribute(format!(
                "expected 4 bytes for IPv4 address, got {}",
                self.value.len()
            ))
        })?;
        Ok(Ipv4Addr::from(bytes))
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let text = text.strip_prefix("0x").unwrap_or(text);
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;

    #[test]
    fn test_string_attribute() {
        let attr = Attribute::string(1, "testuser").unwrap();
        assert_eq!(attr.attr_type, 1);
        assert_eq!(attr.as_string().unwrap(), "testuser");
    }

    #[test]
    fn test_empty_string_rejected() {
        assert!(matches!(
            Attribute::string(1, ""),
            Err(RadiusError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_integer_attribute() {
        let attr = Attribute::integer(5, 1234).unwrap();
        assert_eq!(attr.value, 1234u32.to_be_bytes());
        assert_eq!(attr.as_integer().unwrap(), 1234);
    }

    #[test]
    fn test_ipv4_attribute() {
        let attr = Attribute::ipv4(4, Ipv4Addr::new(10, 0, 0, 1)).unwrap();
        assert_eq!(attr.value, [10, 0, 0, 1]);
        assert_eq!(attr.as_ipv4().unwrap(), Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let attr = Attribute::string(1, "test").unwrap();
        let encoded = attr.encode();
        assert_eq!(encoded, [1, 6, b't', b'e', b's', b't']);
        let decoded = Attribute::decode(&encoded).unwrap();
        assert_eq!(attr, decoded);
    }

    #[test]
    fn test_value_length_boundary() {
        assert!(Attribute::new(11, vec![0u8; 253]).is_ok());
        assert!(matches!(
            Attribute::new(11, vec![0u8; 254]),
            Err(RadiusError::AttributeTooLong(254))
        ));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(Attribute::decode(&[1]).is_err());
        // Declared length beyond the buffer.
        assert!(Attribute::decode(&[1, 6, b'a']).is_err());
        // Length below the TLV header size.
        assert!(Attribute::decode(&[1, 1, 0]).is_err());
    }

    #[test]
    fn test_from_text_integer_alias() {
        let dict = Dictionary::standard();
        let def = dict.lookup_by_name("Service-Type").unwrap();

        let by_alias = Attribute::from_text(def, "Framed-User").unwrap();
        assert_eq!(by_alias.as_integer().unwrap(), 2);
        let by_number = Attribute::from_text(def, "2").unwrap();
        assert_eq!(by_number.value, by_alias.value);

        assert!(matches!(
            Attribute::from_text(def, "not-a-service"),
            Err(RadiusError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_text_ipaddr() {
        let dict = Dictionary::standard();
        let def = dict.lookup_by_name("NAS-IP-Address").unwrap();

        let attr = Attribute::from_text(def, "192.168.1.10").unwrap();
        assert_eq!(attr.value, [192, 168, 1, 10]);
        assert_eq!(attr.display_value(def).unwrap(), "192.168.1.10");

        assert!(matches!(
            Attribute::from_text(def, "192.168.1"),
            Err(RadiusError::InvalidValue { kind: "ipaddr", .. })
        ));
    }

    #[test]
    fn test_from_text_octets() {
        let dict = Dictionary::standard();
        let def = dict.lookup_by_name("Class").unwrap();

        let attr = Attribute::from_text(def, "0xdeadbeef").unwrap();
        assert_eq!(attr.value, [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(attr.display_value(def).unwrap(), "deadbeef");

        assert!(Attribute::from_text(def, "xyz").is_err());
    }

    #[test]
    fn test_display_integer_alias() {
        let dict = Dictionary::standard();
        let def = dict.lookup_by_name("Acct-Status-Type").unwrap();

        let attr = Attribute::integer(def.code, 1).unwrap();
        assert_eq!(attr.display_value(def).unwrap(), "Start");
        let unnamed = Attribute::integer(def.code, 99).unwrap();
        assert_eq!(unnamed.display_value(def).unwrap(), "99");
    }
}
