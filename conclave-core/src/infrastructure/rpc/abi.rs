//! Static call encoding for the fixed multisig account surface.
//!
//! Only the handful of calls this tool makes are encoded here; general ABI
//! discovery belongs to a contract-interaction layer, not this crate.

use crate::domain::TransactionMetadata;
use crate::foundation::ConclaveError;
use alloy_primitives::{keccak256, Address, Bytes, U256};

pub const GET_OWNERS_SIG: &str = "getOwners()";
pub const GET_THRESHOLD_SIG: &str = "getThreshold()";
pub const NONCE_SIG: &str = "nonce()";
pub const EXEC_TRANSACTION_SIG: &str =
    "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";

const WORD: usize = 32;

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn word_from_address(address: Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn word_from_u256(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn push_dynamic_bytes(tail: &mut Vec<u8>, bytes: &[u8]) {
    tail.extend_from_slice(&word_from_u256(U256::from(bytes.len())));
    tail.extend_from_slice(bytes);
    tail.resize(tail.len() + padded_len(bytes.len()) - bytes.len(), 0);
}

/// A zero-argument read call.
pub fn encode_read_call(signature: &str) -> Bytes {
    Bytes::copy_from_slice(&selector(signature))
}

/// `execTransaction` with the collected signatures blob.
pub fn encode_exec_transaction(metadata: &TransactionMetadata, signatures: &[u8]) -> Bytes {
    let head_len = 10 * WORD;
    let data_offset = head_len;
    let signatures_offset = data_offset + WORD + padded_len(metadata.data.len());

    let mut encoded = Vec::with_capacity(4 + signatures_offset + WORD + padded_len(signatures.len()));
    encoded.extend_from_slice(&selector(EXEC_TRANSACTION_SIG));
    encoded.extend_from_slice(&word_from_address(metadata.to));
    encoded.extend_from_slice(&word_from_u256(metadata.value));
    encoded.extend_from_slice(&word_from_u256(U256::from(data_offset)));
    encoded.extend_from_slice(&word_from_u256(U256::from(metadata.kind.as_u8())));
    encoded.extend_from_slice(&word_from_u256(metadata.tx_gas));
    encoded.extend_from_slice(&word_from_u256(metadata.base_gas));
    encoded.extend_from_slice(&word_from_u256(metadata.gas_price));
    encoded.extend_from_slice(&word_from_address(metadata.gas_token));
    encoded.extend_from_slice(&word_from_address(metadata.refund_receiver));
    encoded.extend_from_slice(&word_from_u256(U256::from(signatures_offset)));
    push_dynamic_bytes(&mut encoded, &metadata.data);
    push_dynamic_bytes(&mut encoded, signatures);
    Bytes::from(encoded)
}

fn read_word(output: &[u8], index: usize) -> Result<&[u8], ConclaveError> {
    let start = index * WORD;
    output
        .get(start..start + WORD)
        .ok_or_else(|| ConclaveError::EncodingError(format!("ABI output truncated at word {}", index)))
}

pub fn decode_u256(output: &[u8]) -> Result<U256, ConclaveError> {
    Ok(U256::from_be_slice(read_word(output, 0)?))
}

pub fn decode_u64(output: &[u8]) -> Result<u64, ConclaveError> {
    let value = decode_u256(output)?;
    u64::try_from(value).map_err(|_| ConclaveError::EncodingError("uint does not fit in u64".to_string()))
}

/// Decode a dynamic `address[]` return value.
pub fn decode_address_array(output: &[u8]) -> Result<Vec<Address>, ConclaveError> {
    let offset = usize::try_from(decode_u256(output)?)
        .map_err(|_| ConclaveError::EncodingError("array offset does not fit in usize".to_string()))?;
    if offset % WORD != 0 || offset + WORD > output.len() {
        return Err(ConclaveError::EncodingError("invalid array offset".to_string()));
    }
    let body = &output[offset..];
    let len = usize::try_from(U256::from_be_slice(read_word(body, 0)?))
        .map_err(|_| ConclaveError::EncodingError("array length does not fit in usize".to_string()))?;
    let mut addresses = Vec::with_capacity(len);
    for i in 0..len {
        let word = read_word(body, 1 + i)?;
        addresses.push(Address::from_slice(&word[12..]));
    }
    Ok(addresses)
}
