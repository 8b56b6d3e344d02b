use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid nonce")]
    InvalidNonce,
    #[error("invalid salt")]
    InvalidSalt,
    #[error("key derivation failed")]
    KeyDerivationFailed,
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("crypto backend failed to initialize")]
    CryptoInitFailed,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("a record with this name already exists")]
    DuplicateName,
    #[error("no record at that index")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum VaultFileError {
    #[error("vault file not found")]
    FileNotFound,
    #[error("vault file already exists")]
    FileAlreadyExists,
    #[error("vault file is malformed")]
    InvalidFormat,
    #[error("vault file version is not supported")]
    UnsupportedVersion,
    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
}
