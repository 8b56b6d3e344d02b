pub mod crypto;
pub mod error;
pub mod record;
pub mod secret;
pub mod session;
pub mod vaultfile;

pub use crypto::Argon2Profile;
pub use error::{CryptoError, RecordError, VaultFileError};
pub use record::{Record, RecordList};
pub use secret::SecretBuffer;
pub use session::Session;
pub use vaultfile::{VaultFile, HEADER_SIZE};
