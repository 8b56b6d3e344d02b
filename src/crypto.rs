use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::secret::SecretBuffer;

pub const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 24;
pub const TAG_LEN: usize = 16;

// actual params used are persisted into the vault header, so load() reproduces them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argon2Profile {
    // 64 MiB, 2 passes, parallelism 1
    Interactive,
    // 256 MiB, 3 passes, parallelism 4
    Moderate,
}

impl Argon2Profile {
    pub fn params(self) -> (u32, u32, u32) {
        match self {
            Argon2Profile::Interactive => (65_536, 2, 1),
            Argon2Profile::Moderate => (262_144, 3, 4),
        }
    }
}

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

pub fn derive_key(
    password: &SecretBuffer,
    salt: &[u8; SALT_LEN],
    mem_kib: u32,
    iters: u32,
    parallelism: u32,
) -> Result<[u8; KEY_LEN], CryptoError> {
    let params = Params::new(mem_kib, iters, parallelism, Some(KEY_LEN))
        .map_err(|_| CryptoError::KeyDerivationFailed)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .map_err(|_| CryptoError::KeyDerivationFailed)?;
    Ok(out)
}

pub fn encrypt(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)
}

pub fn decrypt(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

pub fn secure_zero(buf: &mut [u8]) {
    buf.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_salt() -> [u8; SALT_LEN] {
        [0x42; SALT_LEN]
    }

    // P1
    #[test]
    fn derive_key_is_deterministic() {
        let pw = SecretBuffer::from_str("correct horse battery staple");
        let salt = fixed_salt();
        let k1 = derive_key(&pw, &salt, 8192, 1, 1).unwrap();
        let k2 = derive_key(&pw, &salt, 8192, 1, 1).unwrap();
        assert_eq!(k1, k2);
    }

    // P2
    #[test]
    fn different_passwords_derive_different_keys() {
        let salt = fixed_salt();
        let k1 = derive_key(&SecretBuffer::from_str("password1"), &salt, 8192, 1, 1).unwrap();
        let k2 = derive_key(&SecretBuffer::from_str("password2"), &salt, 8192, 1, 1).unwrap();
        assert_ne!(k1, k2);
    }

    // P3
    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let key = [0x11; KEY_LEN];
        let nonce = random_bytes::<NONCE_LEN>();
        let plaintext = b"hello, vault";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    // P4
    #[test]
    fn flipped_ciphertext_bit_fails_authentication() {
        let key = [0x22; KEY_LEN];
        let nonce = random_bytes::<NONCE_LEN>();
        let mut ciphertext = encrypt(&key, &nonce, b"secret").unwrap();

        ciphertext[0] ^= 0xFF;
        assert_eq!(
            decrypt(&key, &nonce, &ciphertext),
            Err(CryptoError::DecryptionFailed)
        );
    }

    // P5
    #[test]
    fn wrong_key_fails_decryption() {
        let key = [0x33; KEY_LEN];
        let wrong_key = [0x44; KEY_LEN];
        let nonce = random_bytes::<NONCE_LEN>();
        let ciphertext = encrypt(&key, &nonce, b"secret").unwrap();

        assert_eq!(
            decrypt(&wrong_key, &nonce, &ciphertext),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn random_bytes_are_not_all_zero() {
        let a = random_bytes::<NONCE_LEN>();
        let b = random_bytes::<NONCE_LEN>();
        assert_ne!(a, [0u8; NONCE_LEN]);
        assert_ne!(a, b);
    }
}