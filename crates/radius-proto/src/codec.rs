//! Wire codec: packet serialization and parsing with the per-code hooks
//! the protocol requires.
//!
//! The hook dispatch replaces a subtype hierarchy with a closed set of
//! shapes: Access-Request obfuscates (and deobfuscates) User-Password,
//! Accounting-Request computes (and checks) its request authenticator over
//! the serialized bytes, and every other code is handled generically.

use crate::attributes::Attribute;
use crate::auth;
use crate::error::RadiusError;
use crate::packet::{codes, Code, Packet};

/// Serialize a request packet.
///
/// For Access-Request a fresh request authenticator is generated and
/// written back to the packet before the User-Password attribute is
/// obfuscated into the output; the packet keeps its cleartext password.
/// For Accounting-Request the authenticator is computed over the
/// zero-authenticator serialization and patched into both the packet and
/// the output.
pub fn encode_request(packet: &mut Packet, secret: &[u8]) -> Result<Vec<u8>, RadiusError> {
    if secret.is_empty() {
        return Err(RadiusError::MissingSecret);
    }

    if packet.code == Code::AccessRequest {
        packet.authenticator = auth::generate_request_authenticator(secret);
    }

    let attribute_bytes = encode_request_attributes(packet, secret)?;
    let mut wire = assemble(packet, &attribute_bytes)?;

    if packet.code == Code::AccountingRequest {
        let digest = auth::accounting_request_authenticator(&wire, secret);
        packet.authenticator = digest;
        wire[4..20].copy_from_slice(&digest);
    }

    Ok(wire)
}

/// Serialize a response packet, deriving its authenticator from the
/// request's. The derived authenticator is written back to the packet.
pub fn encode_response(
    packet: &mut Packet,
    secret: &[u8],
    request_authenticator: &[u8; 16],
) -> Result<Vec<u8>, RadiusError> {
    if secret.is_empty() {
        return Err(RadiusError::MissingSecret);
    }

    let attribute_bytes: Vec<u8> = packet.attributes.iter().flat_map(|a| a.encode()).collect();
    let mut wire = assemble(packet, &attribute_bytes)?;

    let digest = auth::response_authenticator(&wire, request_authenticator, secret);
    packet.authenticator = digest;
    wire[4..20].copy_from_slice(&digest);
    Ok(wire)
}

/// Parse a request datagram.
///
/// Accounting-Request authenticators are verified against the secret;
/// Access-Request authenticators are nonces and accepted as-is, but the
/// User-Password attribute is deobfuscated so the packet carries the
/// cleartext.
pub fn decode_request(data: &[u8], secret: &[u8]) -> Result<Packet, RadiusError> {
    let mut packet = parse(data)?;

    match packet.code {
        Code::AccessRequest => decode_request_attributes(&mut packet, secret)?,
        Code::AccountingRequest => {
            if !auth::verify_accounting_request_authenticator(&data[..packet.length()], secret) {
                return Err(RadiusError::AuthenticatorMismatch);
            }
        }
        _ => {}
    }
    Ok(packet)
}

/// Parse a response datagram bound to `request`.
///
/// The identifier check runs first; the response authenticator is only
/// verified for matching identifiers.
pub fn decode_response(
    data: &[u8],
    secret: &[u8],
    request: &Packet,
) -> Result<Packet, RadiusError> {
    if data.len() >= 2 && data[1] != request.identifier {
        return Err(RadiusError::IdentifierMismatch {
            expected: request.identifier,
            got: data[1],
        });
    }

    let packet = parse(data)?;
    if !auth::verify_response_authenticator(
        &data[..packet.length()],
        &request.authenticator,
        secret,
    ) {
        return Err(RadiusError::AuthenticatorMismatch);
    }
    Ok(packet)
}

/// Request-attribute encoding hook: Access-Request swaps the cleartext
/// User-Password for its obfuscated form during serialization.
fn encode_request_attributes(packet: &Packet, secret: &[u8]) -> Result<Vec<u8>, RadiusError> {
    let mut buffer = Vec::new();
    for attribute in &packet.attributes {
        if packet.code == Code::AccessRequest && attribute.attr_type == codes::USER_PASSWORD {
            let cipher =
                auth::encrypt_user_password(&attribute.value, secret, &packet.authenticator)?;
            buffer.extend_from_slice(&Attribute::new(codes::USER_PASSWORD, cipher)?.encode());
        } else {
            buffer.extend_from_slice(&attribute.encode());
        }
    }
    Ok(buffer)
}

/// Request-attribute decoding hook: the inverse swap on receive.
fn decode_request_attributes(packet: &mut Packet, secret: &[u8]) -> Result<(), RadiusError> {
    let authenticator = packet.authenticator;
    for attribute in &mut packet.attributes {
        if attribute.attr_type == codes::USER_PASSWORD {
            attribute.value =
                auth::decrypt_user_password(&attribute.value, secret, &authenticator)?;
        }
    }
    Ok(())
}

fn assemble(packet: &Packet, attribute_bytes: &[u8]) -> Result<Vec<u8>, RadiusError> {
    let length = Packet::HEADER_LENGTH + attribute_bytes.len();
    if length > Packet::MAX_LENGTH {
        return Err(RadiusError::PacketTooLarge(length));
    }

    let mut wire = Vec::with_capacity(length);
    wire.push(packet.code.as_u8());
    wire.push(packet.identifier);
    wire.extend_from_slice(&(length as u16).to_be_bytes());
    wire.extend_from_slice(&packet.authenticator);
    wire.extend_from_slice(attribute_bytes);
    Ok(wire)
}

/// Header and TLV-walk parse shared by both decode paths.
fn parse(data: &[u8]) -> Result<Packet, RadiusError> {
    if data.len() < Packet::HEADER_LENGTH {
        return Err(RadiusError::MalformedPacket(format!(
            "datagram of {} bytes is below the 20-byte header",
            data.len()
        )));
    }

    let code = Code::from_u8(data[0]).ok_or_else(|| {
        RadiusError::MalformedPacket(format!("unknown packet code {}", data[0]))
    })?;
    let identifier = data[1];
    let length = u16::from_be_bytes([data[2], data[3]]) as usize;

    if !(Packet::HEADER_LENGTH..=Packet::MAX_LENGTH).contains(&length) {
        return Err(RadiusError::MalformedPacket(format!(
            "length field {} outside [20, 4096]",
            length
        )));
    }
    if data.len() < length {
        return Err(RadiusError::MalformedPacket(format!(
            "length field {} exceeds datagram of {} bytes",
            length,
            data.len()
        )));
    }

    let mut authenticator = [0u8; 16];
    authenticator.copy_from_slice(&data[4..20]);

    // Octets past the declared length are ignored per RFC 2865 Section 3.
    let mut attributes = Vec::new();
    let mut remaining = &data[Packet::HEADER_LENGTH..length];
    while !remaining.is_empty() {
        let attribute = Attribute::decode(remaining)
            .map_err(|e| RadiusError::MalformedPacket(e.to_string()))?;
        remaining = &remaining[attribute.encoded_length()..];
        attributes.push(attribute);
    }

    Ok(Packet {
        code,
        identifier,
        authenticator,
        attributes,
    })
}
