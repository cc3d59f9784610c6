//! Byte-level helpers shared by the codec and the authenticator engine.

/// One-shot MD5 over a sequence of byte slices.
///
/// Every call builds a fresh context, so concurrent callers never share
/// digest state.
pub fn md5(parts: &[&[u8]]) -> [u8; 16] {
    let mut ctx = md5::Context::new();
    for part in parts {
        ctx.consume(part);
    }
    ctx.compute().0
}

/// Read a big-endian u32 from the first four bytes of `data`.
pub fn read_u32_be(data: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = data.get(..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Append a u32 in network byte order.
pub fn put_u32_be(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_be_bytes());
}
