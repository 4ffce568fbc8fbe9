#![allow(dead_code)]

use conclave_core::foundation::ChainId;

pub const TEST_CHAIN_ID: ChainId = ChainId::new(11155111);
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Fixed signing secrets; addresses derive deterministically from them.
pub const TEST_SECRET_A: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[31] = 0x01;
    bytes
};

pub const TEST_SECRET_B: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[31] = 0x02;
    bytes
};

pub const TEST_SECRET_C: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[31] = 0x03;
    bytes
};
