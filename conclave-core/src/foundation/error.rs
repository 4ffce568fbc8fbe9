use secp256k1::Error as SecpError;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidAddress,
    InvalidAmount,
    ParseError,
    ConfigError,
    ChainNotFound,
    RecordNotFound,
    IdentityNotFound,
    SecretNotFound,
    RemoteNotFound,
    DuplicateRecord,
    DuplicateIdentity,
    WrongPassword,
    NotAnOwner,
    UnsupportedIdentityKind,
    NoHardwareSigner,
    TerminalRecord,
    InvalidStatusTransition,
    NotSignedLocally,
    ThresholdNotMet,
    ExecutionFailed,
    NetworkError,
    StorageError,
    SerializationError,
    CryptoError,
    EncodingError,
    InsecureFilePermissions,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConclaveError {
    // === Validation ===
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    // === Not found ===
    #[error("unknown chain: {0}")]
    ChainNotFound(String),

    #[error("transaction record not found: {0}")]
    RecordNotFound(String),

    #[error("wallet identity not found: {0}")]
    IdentityNotFound(String),

    #[error("no stored secret for identity: {0}")]
    SecretNotFound(String),

    #[error("remote record not found: {0}")]
    RemoteNotFound(String),

    // === Duplicates ===
    #[error("transaction record already exists: {0}")]
    DuplicateRecord(String),

    #[error("identity with address {address} already exists")]
    DuplicateIdentity { address: String },

    // === Auth failures ===
    #[error("wrong password")]
    WrongPassword,

    #[error("signer {signer} is not an owner of account {account}")]
    NotAnOwner { signer: String, account: String },

    #[error("identity {id} holds no local secret ({kind})")]
    UnsupportedIdentityKind { id: String, kind: String },

    #[error("identity {id} requires a hardware signer but none is connected")]
    NoHardwareSigner { id: String },

    // === Lifecycle ===
    #[error("record {id} is terminal ({status}) and accepts no further writes")]
    TerminalRecord { id: String, status: String },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("record {id} carries no signature from the active identity {signer}")]
    NotSignedLocally { id: String, signer: String },

    #[error("threshold not met: required {required}, collected {collected}")]
    ThresholdNotMet { required: usize, collected: usize },

    #[error("on-chain execution failed: tx {tx_hash}")]
    ExecutionFailed { tx_hash: String },

    // === Infrastructure ===
    #[error("network error during {operation}: {details}")]
    NetworkError { operation: String, details: String },

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("crypto error during {operation}: {details}")]
    CryptoError { operation: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("insecure secret file permissions: {path} has mode {mode:o}, expected 0600")]
    InsecureFilePermissions { path: String, mode: u32 },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ConclaveError>;

impl ConclaveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConclaveError::InvalidAddress(_) => ErrorCode::InvalidAddress,
            ConclaveError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            ConclaveError::ParseError(_) => ErrorCode::ParseError,
            ConclaveError::ConfigError(_) => ErrorCode::ConfigError,
            ConclaveError::ChainNotFound(_) => ErrorCode::ChainNotFound,
            ConclaveError::RecordNotFound(_) => ErrorCode::RecordNotFound,
            ConclaveError::IdentityNotFound(_) => ErrorCode::IdentityNotFound,
            ConclaveError::SecretNotFound(_) => ErrorCode::SecretNotFound,
            ConclaveError::RemoteNotFound(_) => ErrorCode::RemoteNotFound,
            ConclaveError::DuplicateRecord(_) => ErrorCode::DuplicateRecord,
            ConclaveError::DuplicateIdentity { .. } => ErrorCode::DuplicateIdentity,
            ConclaveError::WrongPassword => ErrorCode::WrongPassword,
            ConclaveError::NotAnOwner { .. } => ErrorCode::NotAnOwner,
            ConclaveError::UnsupportedIdentityKind { .. } => ErrorCode::UnsupportedIdentityKind,
            ConclaveError::NoHardwareSigner { .. } => ErrorCode::NoHardwareSigner,
            ConclaveError::TerminalRecord { .. } => ErrorCode::TerminalRecord,
            ConclaveError::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            ConclaveError::NotSignedLocally { .. } => ErrorCode::NotSignedLocally,
            ConclaveError::ThresholdNotMet { .. } => ErrorCode::ThresholdNotMet,
            ConclaveError::ExecutionFailed { .. } => ErrorCode::ExecutionFailed,
            ConclaveError::NetworkError { .. } => ErrorCode::NetworkError,
            ConclaveError::StorageError { .. } => ErrorCode::StorageError,
            ConclaveError::SerializationError { .. } => ErrorCode::SerializationError,
            ConclaveError::CryptoError { .. } => ErrorCode::CryptoError,
            ConclaveError::EncodingError(_) => ErrorCode::EncodingError,
            ConclaveError::InsecureFilePermissions { .. } => ErrorCode::InsecureFilePermissions,
            ConclaveError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    /// True for failures where a retry cannot change the outcome without new input.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ConclaveError::WrongPassword | ConclaveError::NotAnOwner { .. } | ConclaveError::UnsupportedIdentityKind { .. }
        )
    }

    pub fn network_error(operation: impl Into<String>, details: impl Into<String>) -> Self {
        ConclaveError::NetworkError { operation: operation.into(), details: details.into() }
    }

    pub fn storage_error(operation: impl Into<String>, details: impl Into<String>) -> Self {
        ConclaveError::StorageError { operation: operation.into(), details: details.into() }
    }

    pub fn crypto_error(operation: impl Into<String>, details: impl Into<String>) -> Self {
        ConclaveError::CryptoError { operation: operation.into(), details: details.into() }
    }

    pub fn terminal_record(id: impl std::fmt::Display, status: impl std::fmt::Display) -> Self {
        ConclaveError::TerminalRecord { id: id.to_string(), status: status.to_string() }
    }

    pub fn record_not_found(id: impl std::fmt::Display) -> Self {
        ConclaveError::RecordNotFound(id.to_string())
    }
}

impl From<io::Error> for ConclaveError {
    fn from(err: io::Error) -> Self {
        ConclaveError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for ConclaveError {
    fn from(err: serde_json::Error) -> Self {
        ConclaveError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<hex::FromHexError> for ConclaveError {
    fn from(err: hex::FromHexError) -> Self {
        ConclaveError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for ConclaveError {
    fn from(err: toml::de::Error) -> Self {
        ConclaveError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<SecpError> for ConclaveError {
    fn from(err: SecpError) -> Self {
        ConclaveError::CryptoError { operation: "secp256k1".to_string(), details: err.to_string() }
    }
}

impl From<reqwest::Error> for ConclaveError {
    fn from(err: reqwest::Error) -> Self {
        let operation = err.url().map(|u| u.to_string()).unwrap_or_else(|| "http".to_string());
        ConclaveError::NetworkError { operation, details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `ConclaveError` variants at the call site to preserve context.

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::ConclaveError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}
