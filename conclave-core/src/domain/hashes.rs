//! Content-derived transaction identifiers.
//!
//! A transaction identifier is the EIP-712-style digest of its immutable
//! metadata under a (chain id, account) domain, so the same payload hashes to
//! the same id on every machine that proposes it.

use crate::domain::transaction::TransactionMetadata;
use crate::foundation::{ChainId, TxId};
use alloy_primitives::{keccak256, Address, B256, U256};

const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
const TX_TYPE: &str = "MultisigTransaction(address to,uint256 value,bytes32 dataHash,uint8 operation,uint256 txGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

fn word_from_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn word_from_u256(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

fn word_from_u64(value: u64) -> [u8; 32] {
    word_from_u256(U256::from(value))
}

pub fn domain_separator(chain_id: ChainId, account: Address) -> B256 {
    let mut buf = Vec::with_capacity(3 * 32);
    buf.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_slice());
    buf.extend_from_slice(&word_from_u64(chain_id.value()));
    buf.extend_from_slice(&word_from_address(account));
    keccak256(&buf)
}

pub fn struct_hash(metadata: &TransactionMetadata) -> B256 {
    let mut buf = Vec::with_capacity(11 * 32);
    buf.extend_from_slice(keccak256(TX_TYPE.as_bytes()).as_slice());
    buf.extend_from_slice(&word_from_address(metadata.to));
    buf.extend_from_slice(&word_from_u256(metadata.value));
    buf.extend_from_slice(keccak256(&metadata.data).as_slice());
    buf.extend_from_slice(&word_from_u64(u64::from(metadata.kind.as_u8())));
    buf.extend_from_slice(&word_from_u256(metadata.tx_gas));
    buf.extend_from_slice(&word_from_u256(metadata.base_gas));
    buf.extend_from_slice(&word_from_u256(metadata.gas_price));
    buf.extend_from_slice(&word_from_address(metadata.gas_token));
    buf.extend_from_slice(&word_from_address(metadata.refund_receiver));
    buf.extend_from_slice(&word_from_u64(metadata.nonce));
    keccak256(&buf)
}

pub fn transaction_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 2 * 32);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(domain_separator.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    keccak256(&buf)
}

/// The transaction identifier: digest of the metadata under its domain.
pub fn compute_tx_id(chain_id: ChainId, account: Address, metadata: &TransactionMetadata) -> TxId {
    TxId::from(transaction_digest(domain_separator(chain_id, account), struct_hash(metadata)))
}

/// Deterministic address derivation: keccak256 of the uncompressed public
/// key (sans the 0x04 tag), last 20 bytes.
pub fn address_from_public_key(public_key: &secp256k1::PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}
