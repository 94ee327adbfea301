use crate::core::constants::SAVE_VERSION_MAGIC;
use crate::core::store::PersistenceAdapter;
use crate::error::{GameError, Result};
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = 8 + 4;

/// Wraps `data` as: version magic (8 bytes LE), length (4 bytes LE), data,
/// then a SHA256 checksum over everything before it.
pub fn encode_envelope(data: &[u8]) -> Vec<u8> {
    let data_len = data.len() as u32;
    let mut hasher = Sha256::new();
    hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
    hasher.update(data_len.to_le_bytes());
    hasher.update(data);
    let checksum = hasher.finalize();

    let mut out = Vec::with_capacity(HEADER_LEN + data.len() + CHECKSUM_LEN);
    out.extend_from_slice(&SAVE_VERSION_MAGIC.to_le_bytes());
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&checksum);
    out
}

/// Verifies an envelope and returns its payload.
pub fn decode_envelope(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(GameError::CorruptSave("file is truncated".to_string()));
    }
    let (version_bytes, rest) = bytes.split_at(8);
    let (length_bytes, rest) = rest.split_at(4);
    let mut version = [0u8; 8];
    version.copy_from_slice(version_bytes);
    let version = u64::from_le_bytes(version);
    if version != SAVE_VERSION_MAGIC {
        return Err(GameError::CorruptSave(format!(
            "invalid save version: expected 0x{SAVE_VERSION_MAGIC:016X}, got 0x{version:016X}"
        )));
    }
    let mut length = [0u8; 4];
    length.copy_from_slice(length_bytes);
    let data_len = u32::from_le_bytes(length) as usize;
    if rest.len() != data_len + CHECKSUM_LEN {
        return Err(GameError::CorruptSave("length does not match file size".to_string()));
    }
    let (data, stored_checksum) = rest.split_at(data_len);

    let mut hasher = Sha256::new();
    hasher.update(version_bytes);
    hasher.update(length_bytes);
    hasher.update(data);
    if hasher.finalize().as_slice() != stored_checksum {
        return Err(GameError::CorruptSave("checksum verification failed".to_string()));
    }
    Ok(data.to_vec())
}

/// Saves each key to `<dir>/<key>.sav` inside a checksummed envelope.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    dir: PathBuf,
}

impl FileAdapter {
    /// Uses the platform data directory.
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "wayfarer").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
        })?;
        Self::at(project_dirs.data_dir())
    }

    pub fn at(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    #[cfg(test)]
    fn new_for_test() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "wayfarer-test-{}-{test_id}",
            std::process::id()
        ));
        Self::at(&dir)
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.sav"))
    }
}

impl PersistenceAdapter for FileAdapter {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data = decode_envelope(&bytes)?;
        let json = String::from_utf8(data)
            .map_err(|_| GameError::CorruptSave("payload is not UTF-8".to_string()))?;
        Ok(Some(json))
    }

    fn save(&mut self, key: &str, data: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("sav.tmp");
        fs::write(&tmp, encode_envelope(data.as_bytes()))?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
