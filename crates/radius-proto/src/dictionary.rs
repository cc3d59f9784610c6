//! Attribute dictionary.
//!
//! Maps `(vendor, code)` pairs and attribute names to typed definitions.
//! The dictionary is built once at startup (the embedded standard table,
//! optionally merged with site-specific registrations) and is read-only
//! afterwards, so concurrent lookups need no synchronization.

use crate::error::RadiusError;
use std::collections::HashMap;

/// Value encoding of a dictionary attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// UTF-8 text, 1..=253 bytes. Empty values are rejected.
    Text,
    /// Unsigned 32-bit integer, network byte order.
    Integer,
    /// IPv4 address, four octets, rendered dotted-quad.
    Ipv4,
    /// Opaque bytes, 0..=253.
    Octets,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Integer => "integer",
            ValueKind::Ipv4 => "ipaddr",
            ValueKind::Octets => "octets",
        }
    }
}

/// A single dictionary entry: the attribute's name, its numeric identity,
/// its value kind, and (for integers) any enumerated named values.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    pub name: String,
    pub vendor_id: Option<u32>,
    pub code: u8,
    pub kind: ValueKind,
    /// Named aliases for integer values, e.g. `("Login-User", 1)`.
    pub values: Vec<(String, u32)>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, vendor_id: Option<u32>, code: u8, kind: ValueKind) -> Self {
        AttributeDefinition {
            name: name.into(),
            vendor_id,
            code,
            kind,
            values: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: &[(&str, u32)]) -> Self {
        self.values = values
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        self
    }

    /// Resolve a named integer alias (case-insensitive).
    pub fn value_by_name(&self, name: &str) -> Option<u32> {
        self.values
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Reverse lookup: the alias registered for an integer value, if any.
    pub fn value_name(&self, value: u32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(alias, _)| alias.as_str())
    }
}

/// Bidirectional attribute registry.
///
/// Two precomputed hash indexes back the lookups: by lowercased name and by
/// `(vendor, code)`. Name collisions across vendor spaces are allowed (the
/// first registration wins the name index); `(vendor, code)` pairs and
/// names within one vendor space must be unique.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    definitions: Vec<AttributeDefinition>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<(Option<u32>, u8), usize>,
    vendors: HashMap<u32, String>,
}

impl Dictionary {
    /// An empty dictionary. Most callers want [`Dictionary::standard`].
    pub fn new() -> Self {
        Dictionary::default()
    }

    /// Register an attribute definition.
    ///
    /// Fails when the `(vendor, code)` pair is already taken, or when the
    /// name is already registered in the same vendor space.
    pub fn register(&mut self, definition: AttributeDefinition) -> Result<(), RadiusError> {
        let code_key = (definition.vendor_id, definition.code);
        if self.by_code.contains_key(&code_key) {
            return Err(RadiusError::DuplicateAttribute(format!(
                "(vendor {:?}, code {})",
                definition.vendor_id, definition.code
            )));
        }

        let name_key = definition.name.to_ascii_lowercase();
        let name_taken = self.definitions.iter().any(|existing| {
            existing.vendor_id == definition.vendor_id
                && existing.name.eq_ignore_ascii_case(&definition.name)
        });
        if name_taken {
            return Err(RadiusError::DuplicateAttribute(format!(
                "name {:?}",
                definition.name
            )));
        }

        let index = self.definitions.len();
        self.definitions.push(definition);
        self.by_code.insert(code_key, index);
        // First registration wins the name index; later same-named entries
        // in other vendor spaces stay reachable by (vendor, code).
        self.by_name.entry(name_key).or_insert(index);
        Ok(())
    }

    /// Register a vendor name for `vendor_name` lookups.
    pub fn register_vendor(&mut self, vendor_id: u32, name: impl Into<String>) {
        self.vendors.insert(vendor_id, name.into());
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&AttributeDefinition> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&index| &self.definitions[index])
    }

    pub fn lookup_by_code(&self, vendor_id: Option<u32>, code: u8) -> Option<&AttributeDefinition> {
        self.by_code
            .get(&(vendor_id, code))
            .map(|&index| &self.definitions[index])
    }

    pub fn vendor_name(&self, vendor_id: u32) -> Option<&str> {
        self.vendors.get(&vendor_id).map(String::as_str)
    }

    /// Fold another dictionary's definitions and vendors into this one.
    /// Collisions follow the [`Dictionary::register`] rules.
    pub fn merge(&mut self, other: Dictionary) -> Result<(), RadiusError> {
        for definition in other.definitions {
            self.register(definition)?;
        }
        for (vendor_id, name) in other.vendors {
            self.vendors.entry(vendor_id).or_insert(name);
        }
        Ok(())
    }

    /// The embedded default dictionary: every assigned standard attribute
    /// code in 1..=79, including the enumerated values of RFC 2865/2866
    /// integer attributes.
    pub fn standard() -> Self {
        let mut dict = Dictionary::new();

        let entries: Vec<AttributeDefinition> = vec![
            AttributeDefinition::new("User-Name", None, 1, ValueKind::Text),
            AttributeDefinition::new("User-Password", None, 2, ValueKind::Text),
            AttributeDefinition::new("CHAP-Password", None, 3, ValueKind::Octets),
            AttributeDefinition::new("NAS-IP-Address", None, 4, ValueKind::Ipv4),
            AttributeDefinition::new("NAS-Port", None, 5, ValueKind::Integer),
            AttributeDefinition::new("Service-Type", None, 6, ValueKind::Integer).with_values(&[
                ("Login-User", 1),
                ("Framed-User", 2),
                ("Callback-Login-User", 3),
                ("Callback-Framed-User", 4),
                ("Outbound-User", 5),
                ("Administrative-User", 6),
                ("NAS-Prompt-User", 7),
                ("Authenticate-Only", 8),
                ("Callback-NAS-Prompt", 9),
            ]),
            AttributeDefinition::new("Framed-Protocol", None, 7, ValueKind::Integer).with_values(
                &[
                    ("PPP", 1),
                    ("SLIP", 2),
                    ("ARAP", 3),
                    ("Gandalf-SLML", 4),
                    ("Xylogics-IPX-SLIP", 5),
                    ("X.75-Synchronous", 6),
                ],
            ),
            AttributeDefinition::new("Framed-IP-Address", None, 8, ValueKind::Ipv4),
            AttributeDefinition::new("Framed-IP-Netmask", None, 9, ValueKind::Ipv4),
            AttributeDefinition::new("Framed-Routing", None, 10, ValueKind::Integer).with_values(
                &[
                    ("None", 0),
                    ("Broadcast", 1),
                    ("Listen", 2),
                    ("Broadcast-Listen", 3),
                ],
            ),
            AttributeDefinition::new("Filter-Id", None, 11, ValueKind::Text),
            AttributeDefinition::new("Framed-MTU", None, 12, ValueKind::Integer),
            AttributeDefinition::new("Framed-Compression", None, 13, ValueKind::Integer)
                .with_values(&[
                    ("None", 0),
                    ("Van-Jacobson-TCP-IP", 1),
                    ("IPX-Header", 2),
                    ("Stac-LZS", 3),
                ]),
            AttributeDefinition::new("Login-IP-Host", None, 14, ValueKind::Ipv4),
            AttributeDefinition::new("Login-Service", None, 15, ValueKind::Integer).with_values(
                &[
                    ("Telnet", 0),
                    ("Rlogin", 1),
                    ("TCP-Clear", 2),
                    ("PortMaster", 3),
                    ("LAT", 4),
                    ("X25-PAD", 5),
                    ("X25-T3POS", 6),
                    ("TCP-Clear-Quiet", 8),
                ],
            ),
            AttributeDefinition::new("Login-TCP-Port", None, 16, ValueKind::Integer),
            AttributeDefinition::new("Reply-Message", None, 18, ValueKind::Text),
            AttributeDefinition::new("Callback-Number", None, 19, ValueKind::Text),
            AttributeDefinition::new("Callback-Id", None, 20, ValueKind::Text),
            AttributeDefinition::new("Framed-Route", None, 22, ValueKind::Text),
            AttributeDefinition::new("Framed-IPX-Network", None, 23, ValueKind::Integer),
            AttributeDefinition::new("State", None, 24, ValueKind::Octets),
            AttributeDefinition::new("Class", None, 25, ValueKind::Octets),
            AttributeDefinition::new("Vendor-Specific", None, 26, ValueKind::Octets),
            AttributeDefinition::new("Session-Timeout", None, 27, ValueKind::Integer),
            AttributeDefinition::new("Idle-Timeout", None, 28, ValueKind::Integer),
            AttributeDefinition::new("Termination-Action", None, 29, ValueKind::Integer)
                .with_values(&[("Default", 0), ("RADIUS-Request", 1)]),
            AttributeDefinition::new("Called-Station-Id", None, 30, ValueKind::Text),
            AttributeDefinition::new("Calling-Station-Id", None, 31, ValueKind::Text),
            AttributeDefinition::new("NAS-Identifier", None, 32, ValueKind::Text),
            AttributeDefinition::new("Proxy-State", None, 33, ValueKind::Octets),
            AttributeDefinition::new("Login-LAT-Service", None, 34, ValueKind::Text),
            AttributeDefinition::new("Login-LAT-Node", None, 35, ValueKind::Text),
            AttributeDefinition::new("Login-LAT-Group", None, 36, ValueKind::Octets),
            AttributeDefinition::new("Framed-AppleTalk-Link", None, 37, ValueKind::Integer),
            AttributeDefinition::new("Framed-AppleTalk-Network", None, 38, ValueKind::Integer),
            AttributeDefinition::new("Framed-AppleTalk-Zone", None, 39, ValueKind::Text),
            AttributeDefinition::new("Acct-Status-Type", None, 40, ValueKind::Integer).with_values(
                &[
                    ("Start", 1),
                    ("Stop", 2),
                    ("Interim-Update", 3),
                    ("Accounting-On", 7),
                    ("Accounting-Off", 8),
                ],
            ),
            AttributeDefinition::new("Acct-Delay-Time", None, 41, ValueKind::Integer),
            AttributeDefinition::new("Acct-Input-Octets", None, 42, ValueKind::Integer),
            AttributeDefinition::new("Acct-Output-Octets", None, 43, ValueKind::Integer),
            AttributeDefinition::new("Acct-Session-Id", None, 44, ValueKind::Text),
            AttributeDefinition::new("Acct-Authentic", None, 45, ValueKind::Integer).with_values(
                &[("RADIUS", 1), ("Local", 2), ("Remote", 3)],
            ),
            AttributeDefinition::new("Acct-Session-Time", None, 46, ValueKind::Integer),
            AttributeDefinition::new("Acct-Input-Packets", None, 47, ValueKind::Integer),
            AttributeDefinition::new("Acct-Output-Packets", None, 48, ValueKind::Integer),
            AttributeDefinition::new("Acct-Terminate-Cause", None, 49, ValueKind::Integer)
                .with_values(&[
                    ("User-Request", 1),
                    ("Lost-Carrier", 2),
                    ("Lost-Service", 3),
                    ("Idle-Timeout", 4),
                    ("Session-Timeout", 5),
                    ("Admin-Reset", 6),
                    ("Admin-Reboot", 7),
                    ("Port-Error", 8),
                    ("NAS-Error", 9),
                    ("NAS-Request", 10),
                    ("NAS-Reboot", 11),
                    ("Port-Unneeded", 12),
                    ("Port-Preempted", 13),
                    ("Port-Suspended", 14),
                    ("Service-Unavailable", 15),
                    ("Callback", 16),
                    ("User-Error", 17),
                    ("Host-Request", 18),
                ]),
            AttributeDefinition::new("Acct-Multi-Session-Id", None, 50, ValueKind::Text),
            AttributeDefinition::new("Acct-Link-Count", None, 51, ValueKind::Integer),
            AttributeDefinition::new("Acct-Input-Gigawords", None, 52, ValueKind::Integer),
            AttributeDefinition::new("Acct-Output-Gigawords", None, 53, ValueKind::Integer),
            AttributeDefinition::new("Event-Timestamp", None, 55, ValueKind::Integer),
            AttributeDefinition::new("CHAP-Challenge", None, 60, ValueKind::Octets),
            AttributeDefinition::new("NAS-Port-Type", None, 61, ValueKind::Integer).with_values(
                &[
                    ("Async", 0),
                    ("Sync", 1),
                    ("ISDN", 2),
                    ("ISDN-V120", 3),
                    ("ISDN-V110", 4),
                    ("Virtual", 5),
                    ("PIAFS", 6),
                    ("HDLC-Clear-Channel", 7),
                    ("X.25", 8),
                    ("X.75", 9),
                    ("G.3-Fax", 10),
                    ("SDSL", 11),
                    ("ADSL-CAP", 12),
                    ("ADSL-DMT", 13),
                    ("IDSL", 14),
                    ("Ethernet", 15),
                    ("xDSL", 16),
                    ("Cable", 17),
                    ("Wireless-Other", 18),
                    ("Wireless-802.11", 19),
                ],
            ),
            AttributeDefinition::new("Port-Limit", None, 62, ValueKind::Integer),
            AttributeDefinition::new("Login-LAT-Port", None, 63, ValueKind::Text),
            AttributeDefinition::new("Tunnel-Type", None, 64, ValueKind::Integer),
            AttributeDefinition::new("Tunnel-Medium-Type", None, 65, ValueKind::Integer),
            AttributeDefinition::new("Tunnel-Client-Endpoint", None, 66, ValueKind::Text),
            AttributeDefinition::new("Tunnel-Server-Endpoint", None, 67, ValueKind::Text),
            AttributeDefinition::new("Acct-Tunnel-Connection", None, 68, ValueKind::Text),
            AttributeDefinition::new("Tunnel-Password", None, 69, ValueKind::Octets),
            AttributeDefinition::new("ARAP-Password", None, 70, ValueKind::Octets),
            AttributeDefinition::new("ARAP-Features", None, 71, ValueKind::Octets),
            AttributeDefinition::new("ARAP-Zone-Access", None, 72, ValueKind::Integer),
            AttributeDefinition::new("ARAP-Security", None, 73, ValueKind::Integer),
            AttributeDefinition::new("ARAP-Security-Data", None, 74, ValueKind::Text),
            AttributeDefinition::new("Password-Retry", None, 75, ValueKind::Integer),
            AttributeDefinition::new("Prompt", None, 76, ValueKind::Integer),
            AttributeDefinition::new("Connect-Info", None, 77, ValueKind::Text),
            AttributeDefinition::new("Configuration-Token", None, 78, ValueKind::Text),
            AttributeDefinition::new("EAP-Message", None, 79, ValueKind::Octets),
        ];

        for entry in entries {
            // The embedded table is collision-free by construction.
            dict.register(entry).expect("embedded dictionary entry");
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_covers_assigned_codes() {
        let dict = Dictionary::standard();
        for code in [1u8, 2, 4, 26, 33, 40, 61, 79] {
            assert!(dict.lookup_by_code(None, code).is_some(), "code {}", code);
        }
        assert!(dict.lookup_by_code(None, 17).is_none()); // unassigned
    }

    #[test]
    fn test_lookup_both_directions() {
        let dict = Dictionary::standard();
        let by_name = dict.lookup_by_name("user-name").unwrap();
        assert_eq!(by_name.code, 1);
        let by_code = dict.lookup_by_code(None, 1).unwrap();
        assert_eq!(by_code.name, "User-Name");
        assert_eq!(by_code.kind, ValueKind::Text);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut dict = Dictionary::standard();
        let dup = AttributeDefinition::new("Shadow-User-Name", None, 1, ValueKind::Text);
        assert!(dict.register(dup).is_err());
    }

    #[test]
    fn test_duplicate_name_same_vendor_rejected() {
        let mut dict = Dictionary::standard();
        let dup = AttributeDefinition::new("User-Name", None, 200, ValueKind::Text);
        assert!(dict.register(dup).is_err());
    }

    #[test]
    fn test_name_collision_across_vendors_allowed() {
        let mut dict = Dictionary::standard();
        let vendor_attr = AttributeDefinition::new("User-Name", Some(9), 1, ValueKind::Text);
        assert!(dict.register(vendor_attr).is_ok());
        // The standard entry keeps the name index.
        assert_eq!(dict.lookup_by_name("User-Name").unwrap().vendor_id, None);
        assert!(dict.lookup_by_code(Some(9), 1).is_some());
    }

    #[test]
    fn test_named_values() {
        let dict = Dictionary::standard();
        let service_type = dict.lookup_by_name("Service-Type").unwrap();
        assert_eq!(service_type.value_by_name("Login-User"), Some(1));
        assert_eq!(service_type.value_by_name("login-user"), Some(1));
        assert_eq!(service_type.value_name(2), Some("Framed-User"));
        assert_eq!(service_type.value_by_name("No-Such-Alias"), None);
    }

    #[test]
    fn test_vendor_names() {
        let mut dict = Dictionary::standard();
        assert_eq!(dict.vendor_name(9), None);
        dict.register_vendor(9, "Cisco");
        assert_eq!(dict.vendor_name(9), Some("Cisco"));
    }

    #[test]
    fn test_merge() {
        let mut dict = Dictionary::standard();
        let mut site = Dictionary::new();
        site.register(AttributeDefinition::new(
            "Acme-AVPair",
            Some(4242),
            1,
            ValueKind::Text,
        ))
        .unwrap();
        site.register_vendor(4242, "Acme");

        dict.merge(site).unwrap();
        assert!(dict.lookup_by_name("Acme-AVPair").is_some());
        assert_eq!(dict.vendor_name(4242), Some("Acme"));
    }
}
