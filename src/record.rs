use crate::error::{RecordError, VaultFileError};
use crate::secret::SecretBuffer;

#[derive(Debug, PartialEq, Eq)]
pub struct Record {
    pub name: SecretBuffer,
    pub username: SecretBuffer,
    pub secret: SecretBuffer,
}

impl Record {
    pub fn new(name: SecretBuffer, username: SecretBuffer, secret: SecretBuffer) -> Self {
        Self {
            name,
            username,
            secret,
        }
    }
}

// no two records may share a name; insertion order is preserved
#[derive(Debug, Default)]
pub struct RecordList {
    records: Vec<Record>,
}

impl RecordList {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn name_taken(&self, name: &SecretBuffer) -> bool {
        self.records.iter().any(|r| &r.name == name)
    }

    pub fn add(&mut self, record: Record) -> Result<(), RecordError> {
        if self.name_taken(&record.name) {
            return Err(RecordError::DuplicateName);
        }
        self.records.push(record);
        Ok(())
    }

    // does not re-check name uniqueness against the rest of the list; that's
    // left to the caller, same as a rename in a plain key-value store
    pub fn update(&mut self, index: usize, record: Record) -> Result<(), RecordError> {
        let slot = self.records.get_mut(index).ok_or(RecordError::NotFound)?;
        *slot = record;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<(), RecordError> {
        if index >= self.records.len() {
            return Err(RecordError::NotFound);
        }
        self.records.remove(index);
        Ok(())
    }

    // u32 count, then per record three (u32 len, bytes) pairs: name, username, secret
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();

        let append_bytes = |out: &mut Vec<u8>, bytes: &[u8]| {
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        };

        out.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        for record in &self.records {
            append_bytes(&mut out, record.name.as_bytes());
            append_bytes(&mut out, record.username.as_bytes());
            append_bytes(&mut out, record.secret.as_bytes());
        }

        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, VaultFileError> {
        let mut offset = 0usize;

        let count = read_u32(data, &mut offset)?;
        let mut list = RecordList::new();

        for _ in 0..count {
            let name = SecretBuffer::from_slice(read_bytes(data, &mut offset)?);
            let username = SecretBuffer::from_slice(read_bytes(data, &mut offset)?);
            let secret = SecretBuffer::from_slice(read_bytes(data, &mut offset)?);

            list.add(Record::new(name, username, secret))
                .map_err(|_| VaultFileError::InvalidFormat)?;
        }

        if offset != data.len() {
            return Err(VaultFileError::InvalidFormat);
        }

        Ok(list)
    }
}

fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32, VaultFileError> {
    let end = offset
        .checked_add(4)
        .ok_or(VaultFileError::InvalidFormat)?;
    let slice = data.get(*offset..end).ok_or(VaultFileError::InvalidFormat)?;
    let value = u32::from_le_bytes(slice.try_into().unwrap());
    *offset = end;
    Ok(value)
}

fn read_bytes<'a>(data: &'a [u8], offset: &mut usize) -> Result<&'a [u8], VaultFileError> {
    let len = read_u32(data, offset)? as usize;
    let end = offset
        .checked_add(len)
        .ok_or(VaultFileError::InvalidFormat)?;
    let slice = data.get(*offset..end).ok_or(VaultFileError::InvalidFormat)?;
    *offset = end;
    Ok(slice)
}
