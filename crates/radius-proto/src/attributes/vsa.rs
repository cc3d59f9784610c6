//! Vendor-Specific Attribute container (RFC 2865 Section 5.26).
//!
//! A VSA is attribute code 26 whose value is a four-byte big-endian vendor
//! id followed by a sequence of sub-attribute TLVs:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |    Length     |            Vendor-Id
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!      Vendor-Id (cont)           |  Vendor type  | Vendor length |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Attribute-Specific ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//! ```

use crate::attributes::Attribute;
use crate::dictionary::Dictionary;
use crate::error::RadiusError;
use crate::octets;

/// Attribute code of the Vendor-Specific container.
pub const VENDOR_SPECIFIC: u8 = 26;

/// The serialized vendor-id prefix plus sub-attribute TLVs must stay
/// within this many bytes for a single VSA occurrence.
const MAX_INNER_LENGTH: usize = 251;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSpecific {
    vendor_id: u32,
    sub_attributes: Vec<Attribute>,
}

impl VendorSpecific {
    pub fn new(vendor_id: u32) -> Self {
        VendorSpecific {
            vendor_id,
            sub_attributes: Vec::new(),
        }
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    /// Sub-attributes in insertion order.
    pub fn sub_attributes(&self) -> &[Attribute] {
        &self.sub_attributes
    }

    /// Append a sub-attribute built from raw bytes.
    pub fn add(&mut self, attr_type: u8, value: Vec<u8>) -> Result<(), RadiusError> {
        let attribute = Attribute::vendor(self.vendor_id, attr_type, value)?;
        self.sub_attributes.push(attribute);
        Ok(())
    }

    /// Append a prebuilt sub-attribute. Its vendor id must match the
    /// container's.
    pub fn add_sub_attribute(&mut self, attribute: Attribute) -> Result<(), RadiusError> {
        if attribute.vendor_id != Some(self.vendor_id) {
            return Err(RadiusError::MalformedAttribute(format!(
                "sub-attribute vendor {:?} does not match container vendor {}",
                attribute.vendor_id, self.vendor_id
            )));
        }
        self.sub_attributes.push(attribute);
        Ok(())
    }

    /// All sub-attributes with the given type, in insertion order.
    pub fn find_all(&self, attr_type: u8) -> Vec<&Attribute> {
        self.sub_attributes
            .iter()
            .filter(|a| a.attr_type == attr_type)
            .collect()
    }

    /// Single-occurrence getter: fails when more than one sub-attribute
    /// carries the type.
    pub fn find(&self, attr_type: u8) -> Result<Option<&Attribute>, RadiusError> {
        let matches = self.find_all(attr_type);
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            _ => Err(RadiusError::AmbiguousAttribute(format!(
                "vendor {} sub-attribute {}",
                self.vendor_id, attr_type
            ))),
        }
    }

    /// Single-occurrence getter by dictionary name within this vendor
    /// space.
    pub fn find_by_name(
        &self,
        dictionary: &Dictionary,
        name: &str,
    ) -> Result<Option<&Attribute>, RadiusError> {
        let definition = dictionary
            .lookup_by_name(name)
            .filter(|def| def.vendor_id == Some(self.vendor_id))
            .ok_or_else(|| RadiusError::UnknownAttribute(name.to_string()))?;
        self.find(definition.code)
    }

    /// Remove every sub-attribute with the given type, keeping the order
    /// of the rest.
    pub fn remove(&mut self, attr_type: u8) {
        self.sub_attributes.retain(|a| a.attr_type != attr_type);
    }

    /// Serialize into a code-26 [`Attribute`].
    pub fn to_attribute(&self) -> Result<Attribute, RadiusError> {
        let mut inner = Vec::new();
        octets::put_u32_be(&mut inner, self.vendor_id);
        for sub in &self.sub_attributes {
            inner.extend_from_slice(&sub.encode());
        }
        if inner.len() > MAX_INNER_LENGTH {
            return Err(RadiusError::AttributeTooLong(inner.len()));
        }
        Attribute::new(VENDOR_SPECIFIC, inner)
    }

    /// Parse a code-26 attribute back into a container. The sub-TLV walk
    /// must consume the value exactly.
    pub fn from_attribute(attribute: &Attribute) -> Result<Self, RadiusError> {
        if attribute.attr_type != VENDOR_SPECIFIC {
            return Err(RadiusError::MalformedAttribute(format!(
                "attribute {} is not Vendor-Specific",
                attribute.attr_type
            )));
        }
        // Outer length >= 6 means a value of at least the vendor-id prefix.
        let vendor_id = octets::read_u32_be(&attribute.value).ok_or_else(|| {
            RadiusError::MalformedAttribute(format!(
                "Vendor-Specific value of {} bytes lacks a vendor id",
                attribute.value.len()
            ))
        })?;

        let mut sub_attributes = Vec::new();
        let mut remaining = &attribute.value[4..];
        while !remaining.is_empty() {
            let mut sub = Attribute::decode(remaining)?;
            sub.vendor_id = Some(vendor_id);
            remaining = &remaining[sub.encoded_length()..];
            sub_attributes.push(sub);
        }

        Ok(VendorSpecific {
            vendor_id,
            sub_attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{AttributeDefinition, ValueKind};

    #[test]
    fn test_wire_layout() {
        let mut vsa = VendorSpecific::new(9);
        vsa.add(1, b"cisco-avpair=foo".to_vec()).unwrap();

        let attr = vsa.to_attribute().unwrap();
        let encoded = attr.encode();
        // 26, total length, vendor id 9, sub TLV (type 1, length 18).
        assert_eq!(encoded[0], 0x1a);
        assert_eq!(encoded[1] as usize, encoded.len());
        assert_eq!(&encoded[2..6], &[0, 0, 0, 9]);
        assert_eq!(encoded[6], 1);
        assert_eq!(encoded[7], 18);
        assert_eq!(&encoded[8..], b"cisco-avpair=foo");
    }

    #[test]
    fn test_round_trip() {
        let mut vsa = VendorSpecific::new(311);
        vsa.add(1, b"first".to_vec()).unwrap();
        vsa.add(2, vec![0, 0, 0, 7]).unwrap();

        let parsed = VendorSpecific::from_attribute(&vsa.to_attribute().unwrap()).unwrap();
        assert_eq!(parsed, vsa);
        assert_eq!(parsed.sub_attributes()[0].vendor_id, Some(311));
    }

    #[test]
    fn test_empty_container_round_trips() {
        let vsa = VendorSpecific::new(42);
        let attr = vsa.to_attribute().unwrap();
        assert_eq!(attr.value, [0, 0, 0, 42]);
        let parsed = VendorSpecific::from_attribute(&attr).unwrap();
        assert!(parsed.sub_attributes().is_empty());
    }

    #[test]
    fn test_truncated_vendor_id() {
        let attr = Attribute::new(VENDOR_SPECIFIC, vec![0, 0, 9]).unwrap();
        assert!(VendorSpecific::from_attribute(&attr).is_err());
    }

    #[test]
    fn test_sub_walk_must_consume_exactly() {
        // Sub-TLV claims 6 bytes but only 4 remain after the header.
        let mut value = vec![0, 0, 0, 9];
        value.extend_from_slice(&[1, 6, b'a', b'b']);
        let attr = Attribute::new(VENDOR_SPECIFIC, value).unwrap();
        assert!(VendorSpecific::from_attribute(&attr).is_err());

        // Sub-TLV with length below 2.
        let mut value = vec![0, 0, 0, 9];
        value.extend_from_slice(&[1, 1, 0]);
        let attr = Attribute::new(VENDOR_SPECIFIC, value).unwrap();
        assert!(VendorSpecific::from_attribute(&attr).is_err());
    }

    #[test]
    fn test_inner_size_limit() {
        let mut vsa = VendorSpecific::new(9);
        vsa.add(1, vec![0u8; 130]).unwrap();
        vsa.add(2, vec![0u8; 130]).unwrap();
        assert!(matches!(
            vsa.to_attribute(),
            Err(RadiusError::AttributeTooLong(_))
        ));
    }

    #[test]
    fn test_single_occurrence_getter() {
        let mut vsa = VendorSpecific::new(9);
        vsa.add(1, b"one".to_vec()).unwrap();
        vsa.add(2, b"two".to_vec()).unwrap();
        vsa.add(1, b"again".to_vec()).unwrap();

        assert!(matches!(
            vsa.find(1),
            Err(RadiusError::AmbiguousAttribute(_))
        ));
        assert_eq!(vsa.find(2).unwrap().unwrap().value, b"two");
        assert!(vsa.find(3).unwrap().is_none());
    }

    #[test]
    fn test_find_by_name() {
        let mut dict = Dictionary::standard();
        dict.register(AttributeDefinition::new(
            "Cisco-AVPair",
            Some(9),
            1,
            ValueKind::Text,
        ))
        .unwrap();

        let mut vsa = VendorSpecific::new(9);
        vsa.add(1, b"cisco-avpair=foo".to_vec()).unwrap();

        let found = vsa.find_by_name(&dict, "Cisco-AVPair").unwrap().unwrap();
        assert_eq!(found.value, b"cisco-avpair=foo");
        assert!(vsa.find_by_name(&dict, "No-Such-Attr").is_err());
        // A standard-space name does not resolve inside a vendor space.
        assert!(vsa.find_by_name(&dict, "User-Name").is_err());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut vsa = VendorSpecific::new(9);
        vsa.add(1, b"a".to_vec()).unwrap();
        vsa.add(2, b"b".to_vec()).unwrap();
        vsa.add(1, b"c".to_vec()).unwrap();
        vsa.add(3, b"d".to_vec()).unwrap();

        vsa.remove(1);
        let types: Vec<u8> = vsa.sub_attributes().iter().map(|a| a.attr_type).collect();
        assert_eq!(types, [2, 3]);
    }

    #[test]
    fn test_vendor_mismatch_rejected() {
        let mut vsa = VendorSpecific::new(9);
        let foreign = Attribute::vendor(311, 1, b"x".to_vec()).unwrap();
        assert!(vsa.add_sub_attribute(foreign).is_err());
    }
}
