use crate::foundation::{ConclaveError, Hash32};

/// Parse a 32-byte value from hex, accepting an optional `0x` prefix.
pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, ConclaveError> {
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(stripped)?;
    let array: Hash32 = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConclaveError::EncodingError(format!("expected 32 bytes, got {}", bytes.len())))?;
    Ok(array)
}

/// Decode hex bytes of any length, accepting an optional `0x` prefix.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, ConclaveError> {
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if stripped.is_empty() {
        return Ok(Vec::new());
    }
    Ok(hex::decode(stripped)?)
}

pub fn to_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
