//! Authenticator engine: request/response authenticators per RFC 2865
//! Section 3 and RFC 2866 Section 3, and the User-Password obfuscation of
//! RFC 2865 Section 5.2.
//!
//! The wire-level functions take the fully serialized packet so the digest
//! input is exactly what goes on the wire; the 16 authenticator bytes at
//! offset 4 are substituted as each construction requires.

use crate::error::RadiusError;
use crate::octets::md5;
use crate::packet::Packet;
use rand::Rng;

/// Maximum cleartext User-Password length accepted for obfuscation.
pub const MAX_PASSWORD_LENGTH: usize = 128;

const ZERO_AUTHENTICATOR: [u8; 16] = [0u8; 16];

/// Request Authenticator for an Access-Request.
///
/// The shared secret is mixed into a fresh 16-byte nonce so the caller
/// never controls the authenticator value directly.
pub fn generate_request_authenticator(secret: &[u8]) -> [u8; 16] {
    let mut nonce = [0u8; 16];
    rand::rng().fill(&mut nonce);
    md5(&[secret, &nonce])
}

/// Accounting-Request authenticator (RFC 2866 Section 3):
/// `MD5(Code + ID + Length + 16 zero octets + Attributes + Secret)`,
/// computed over the serialized packet with the authenticator field
/// treated as zeros.
pub fn accounting_request_authenticator(wire: &[u8], secret: &[u8]) -> [u8; 16] {
    md5(&[&wire[0..4], &ZERO_AUTHENTICATOR, &wire[20..], secret])
}

/// Verify the authenticator carried by a serialized Accounting-Request.
pub fn verify_accounting_request_authenticator(wire: &[u8], secret: &[u8]) -> bool {
    accounting_request_authenticator(wire, secret) == wire[4..20]
}

/// Response Authenticator (RFC 2865 Section 3):
/// `MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)`.
pub fn response_authenticator(
    wire: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> [u8; 16] {
    md5(&[&wire[0..4], request_authenticator, &wire[20..], secret])
}

/// Verify a serialized response against the request's authenticator.
pub fn verify_response_authenticator(
    wire: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    response_authenticator(wire, request_authenticator, secret) == wire[4..20]
}

/// Obfuscate a User-Password per RFC 2865 Section 5.2.
///
/// The cleartext is NUL-padded to a multiple of 16 bytes, then each block
/// is XORed with `MD5(secret + previous)` where `previous` starts as the
/// request authenticator and becomes the prior ciphertext block.
pub fn encrypt_user_password(
    password: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, RadiusError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(RadiusError::PasswordTooLong);
    }

    let mut padded = password.to_vec();
    let block_count = padded.len().div_ceil(16).max(1);
    padded.resize(block_count * 16, 0);

    let mut cipher = Vec::with_capacity(padded.len());
    let mut previous = *authenticator;
    for chunk in padded.chunks_exact(16) {
        let mask = md5(&[secret, &previous]);
        for (i, byte) in chunk.iter().enumerate() {
            previous[i] = byte ^ mask[i];
        }
        cipher.extend_from_slice(&previous);
    }
    Ok(cipher)
}

/// Invert the User-Password obfuscation chain and strip the NUL padding.
pub fn decrypt_user_password(
    cipher: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, RadiusError> {
    if cipher.is_empty() || cipher.len() % 16 != 0 || cipher.len() > MAX_PASSWORD_LENGTH {
        return Err(RadiusError::MalformedAttribute(format!(
            "User-Password ciphertext of {} bytes",
            cipher.len()
        )));
    }

    let mut cleartext = Vec::with_capacity(cipher.len());
    let mut previous = authenticator.as_slice();
    for chunk in cipher.chunks_exact(16) {
        let mask = md5(&[secret, previous]);
        for (i, byte) in chunk.iter().enumerate() {
            cleartext.push(byte ^ mask[i]);
        }
        previous = chunk;
    }

    while cleartext.last() == Some(&0) {
        cleartext.pop();
    }
    Ok(cleartext)
}

/// Convenience wrapper computing the response authenticator for a packet
/// that has not been serialized yet.
pub fn packet_response_authenticator(
    packet: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> [u8; 16] {
    let length = packet.length() as u16;
    let header = [
        packet.code.as_u8(),
        packet.identifier,
        (length >> 8) as u8,
        (length & 0xff) as u8,
    ];
    let attribute_bytes: Vec<u8> = packet
        .attributes
        .iter()
        .flat_map(|a| a.encode())
        .collect();
    md5(&[&header, request_authenticator, &attribute_bytes, secret])
}
