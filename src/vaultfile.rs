use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::crypto::{self, Argon2Profile, KEY_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::VaultFileError;
use crate::record::RecordList;
use crate::secret::SecretBuffer;
use crate::session::Session;

const MAGIC: u32 = 0x4C55_4156;
const VERSION: u8 = 1;
const KDF_TYPE_ARGON2ID: u8 = 1;

// magic + version + kdf_type + reserved + three argon2 params + salt + nonce
// + a reserved tail, packed tightly and always little-endian regardless of host
pub const HEADER_SIZE: usize = 76;

struct VaultHeader {
    version: u8,
    kdf_type: u8,
    argon_mem_kib: u32,
    argon_iters: u32,
    argon_parallelism: u32,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
}

impl VaultHeader {
    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buf[4] = self.version;
        buf[5] = self.kdf_type;
        // bytes 6..8 are the reserved u16, left zero.
        buf[8..12].copy_from_slice(&self.argon_mem_kib.to_le_bytes());
        buf[12..16].copy_from_slice(&self.argon_iters.to_le_bytes());
        buf[16..20].copy_from_slice(&self.argon_parallelism.to_le_bytes());
        buf[20..36].copy_from_slice(&self.salt);
        buf[36..60].copy_from_slice(&self.nonce);
        // bytes 60..76 are the reserved tail, left zero.
        buf
    }

    fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, VaultFileError> {
        let magic = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(VaultFileError::InvalidFormat);
        }

        let version = buf[4];
        let kdf_type = buf[5];
        if kdf_type != KDF_TYPE_ARGON2ID {
            return Err(VaultFileError::InvalidFormat);
        }
        if version != VERSION {
            return Err(VaultFileError::UnsupportedVersion);
        }

        let argon_mem_kib = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        let argon_iters = u32::from_le_bytes(buf[12..16].try_into().unwrap());
        let argon_parallelism = u32::from_le_bytes(buf[16..20].try_into().unwrap());

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&buf[20..36]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&buf[36..60]);

        Ok(Self {
            version,
            kdf_type,
            argon_mem_kib,
            argon_iters,
            argon_parallelism,
            salt,
            nonce,
        })
    }
}

pub struct VaultFile;

impl VaultFile {
    pub fn create_new(path: impl AsRef<Path>, password: &str) -> Result<(), VaultFileError> {
        Self::create_new_with_profile(path, password, Argon2Profile::Interactive)
    }

    pub fn create_new_with_profile(
        path: impl AsRef<Path>,
        password: &str,
        profile: Argon2Profile,
    ) -> Result<(), VaultFileError> {
        let path = path.as_ref();

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => VaultFileError::FileAlreadyExists,
                _ => VaultFileError::IOError(e),
            })?;

        let salt = crypto::random_bytes::<SALT_LEN>();
        let nonce = crypto::random_bytes::<NONCE_LEN>();
        let (mem_kib, iters, parallelism) = profile.params();

        let password_buf = SecretBuffer::from_str(password);
        let mut key = crypto::derive_key(&password_buf, &salt, mem_kib, iters, parallelism)?;

        let plaintext = RecordList::new().serialize();
        let ciphertext = crypto::encrypt(&key, &nonce, &plaintext)?;
        crypto::secure_zero(&mut key);

        let header = VaultHeader {
            version: VERSION,
            kdf_type: KDF_TYPE_ARGON2ID,
            argon_mem_kib: mem_kib,
            argon_iters: iters,
            argon_parallelism: parallelism,
            salt,
            nonce,
        };

        file.write_all(&header.to_bytes())?;
        file.write_all(&ciphertext)?;
        file.flush()?;

        info!(path = %path.display(), "created new vault");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, password: &str) -> Result<Session, VaultFileError> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VaultFileError::FileNotFound,
            _ => VaultFileError::IOError(e),
        })?;

        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)
            .map_err(|_| VaultFileError::InvalidFormat)?;
        let header = VaultHeader::from_bytes(&header_buf)?;

        let password_buf = SecretBuffer::from_str(password);
        let mut key = crypto::derive_key(
            &password_buf,
            &header.salt,
            header.argon_mem_kib,
            header.argon_iters,
            header.argon_parallelism,
        )?;

        let mut ciphertext = Vec::new();
        file.read_to_end(&mut ciphertext)?;
        if ciphertext.len() < TAG_LEN {
            crypto::secure_zero(&mut key);
            return Err(VaultFileError::InvalidFormat);
        }

        let plaintext = match crypto::decrypt(&key, &header.nonce, &ciphertext) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %path.display(), "vault unlock failed authentication");
                crypto::secure_zero(&mut key);
                return Err(e.into());
            }
        };

        let records = match RecordList::deserialize(&plaintext) {
            Ok(r) => r,
            Err(e) => {
                crypto::secure_zero(&mut key);
                return Err(e);
            }
        };

        debug!(path = %path.display(), record_count = records.len(), "vault unlocked");
        Ok(Session::new(records, key, path.to_path_buf()))
    }

    // writes to a sibling temp file and renames over the original so a crash
    // mid-write never corrupts it
    pub(crate) fn save(
        path: &Path,
        records: &RecordList,
        key: &[u8; KEY_LEN],
    ) -> Result<(), VaultFileError> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VaultFileError::FileNotFound,
            _ => VaultFileError::IOError(e),
        })?;

        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)
            .map_err(|_| VaultFileError::InvalidFormat)?;
        let mut header = VaultHeader::from_bytes(&header_buf)?;
        drop(file);

        header.nonce = crypto::random_bytes::<NONCE_LEN>();

        let plaintext = records.serialize();
        let ciphertext = crypto::encrypt(key, &header.nonce, &plaintext)?;

        let tmp_path = tmp_path_for(path);
        {
            let mut tmp = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;
            tmp.write_all(&header.to_bytes())?;
            tmp.write_all(&ciphertext)?;
            tmp.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        info!(path = %path.display(), record_count = records.len(), "saved vault");
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".tmp");
    PathBuf::from(os_string)
}
