use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroize;

use crate::crypto::KEY_LEN;
use crate::error::{RecordError, VaultFileError};
use crate::record::{Record, RecordList};
use crate::vaultfile::VaultFile;

pub struct Session {
    records: RecordList,
    key: [u8; KEY_LEN],
    path: PathBuf,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("records", &self.records)
            .field("key", &"<redacted>")
            .field("path", &self.path)
            .finish()
    }
}

impl Session {
    // no public constructor takes a raw key; a Session only comes from VaultFile::load
    pub(crate) fn new(records: RecordList, key: [u8; KEY_LEN], path: PathBuf) -> Self {
        Self {
            records,
            key,
            path,
        }
    }

    pub fn entries(&self) -> &[Record] {
        self.records.entries()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn add(&mut self, record: Record) -> Result<(), RecordError> {
        self.records.add(record)
    }

    pub fn update(&mut self, index: usize, record: Record) -> Result<(), RecordError> {
        self.records.update(index, record)
    }

    pub fn remove(&mut self, index: usize) -> Result<(), RecordError> {
        self.records.remove(index)
    }

    pub fn save(&self) -> Result<(), VaultFileError> {
        VaultFile::save(&self.path, &self.records, &self.key)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::secret::SecretBuffer;

    fn record(name: &str, username: &str, secret: &str) -> Record {
        Record::new(
            SecretBuffer::from_str(name),
            SecretBuffer::from_str(username),
            SecretBuffer::from_str(secret),
        )
    }

    #[test]
    fn save_then_reload_preserves_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.vault");
        VaultFile::create_new(&path, "pw1").unwrap();

        let mut session = VaultFile::load(&path, "pw1").unwrap();
        session
            .add(record("Email", "john.doe@example.com", "HelloWorld123!"))
            .unwrap();
        session.save().unwrap();
        drop(session);

        let reloaded = VaultFile::load(&path, "pw1").unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.entries()[0],
            record("Email", "john.doe@example.com", "HelloWorld123!")
        );
    }

    #[test]
    fn duplicate_add_after_reload_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.vault");
        VaultFile::create_new(&path, "pw1").unwrap();

        let mut session = VaultFile::load(&path, "pw1").unwrap();
        session.add(record("Email", "x", "y")).unwrap();
        session.save().unwrap();
        drop(session);

        let mut reopened = VaultFile::load(&path, "pw1").unwrap();
        let err = reopened.add(record("Email", "x2", "y2")).unwrap_err();
        assert_eq!(err, RecordError::DuplicateName);
        assert_eq!(reopened.len(), 1);
    }

    // P11
    #[test]
    fn dropping_a_session_zeroes_the_key_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.vault");
        VaultFile::create_new(&path, "pw1").unwrap();

        let mut session = VaultFile::load(&path, "pw1").unwrap();
        let key_ptr: *const u8 = session.key.as_ptr();
        let key_len = session.key.len();
        // Force the key to a known non-zero pattern so we can observe the
        // wipe; derive_key output is already unlikely to be all-zero, but
        // this makes the assertion unconditionally meaningful.
        session.key = [0xAB; KEY_LEN];

        drop(session);

        // SAFETY: `[u8; KEY_LEN]` is stored inline in `Session` with no drop
        // glue of its own. Dropping `session` runs `Zeroize::zeroize` on it
        // but does not deallocate or reuse its stack slot before this
        // function returns, so the read below observes the wiped bytes.
        let bytes = unsafe { std::slice::from_raw_parts(key_ptr, key_len) };
        assert!(bytes.iter().all(|&b| b == 0));
    }
}
