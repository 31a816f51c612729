//! Filesystem-backed key store

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use tk_shared::config::KeyConfig;

use super::store::KeyStore;
use crate::domain::entities::signing_key::{KeyMetadata, SigningKeyPair, INITIAL_KEY_ID};
use crate::errors::KeyError;

pub const PRIVATE_KEY_FILE: &str = "private_key.pem";
pub const PUBLIC_KEY_FILE: &str = "public_key.pem";
pub const METADATA_FILE: &str = "key_meta.json";
pub const ARCHIVE_DIR: &str = "archive";

/// Key store persisting PEM files under a single directory
///
/// Layout:
///
/// ```text
/// <keys_dir>/private_key.pem
/// <keys_dir>/public_key.pem
/// <keys_dir>/key_meta.json
/// <keys_dir>/archive/private_key_<ts>.pem
/// <keys_dir>/archive/public_key_<ts>.pem
/// <keys_dir>/archive/key_meta_<ts>.json
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    keys_dir: PathBuf,
}

impl FileKeyStore {
    pub fn new(keys_dir: impl Into<PathBuf>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
        }
    }

    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(config.keys_dir.clone())
    }

    pub fn keys_dir(&self) -> &Path {
        &self.keys_dir
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.keys_dir.join(PRIVATE_KEY_FILE)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.keys_dir.join(PUBLIC_KEY_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.keys_dir.join(METADATA_FILE)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.keys_dir.join(ARCHIVE_DIR)
    }

    /// Writes the three files of a pair into `dir` and swaps them into place
    ///
    /// Either all three targets hold the new pair afterwards or all three
    /// still hold what they held before; staged files never outlive the call.
    async fn write_pair(
        &self,
        dir: &Path,
        names: PairFileNames,
        pair: &SigningKeyPair,
        metadata: &KeyMetadata,
    ) -> io::Result<()> {
        let metadata_json = serde_json::to_vec_pretty(metadata)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let files = vec![
            PairFile::new(names.private, pair.private_pem().as_bytes(), true),
            PairFile::new(names.public, pair.public_pem().as_bytes(), false),
            PairFile::new(names.metadata, &metadata_json, false),
        ];
        let dir = dir.to_path_buf();

        // The blocking task finishes its commit or rollback even when the
        // caller is cancelled
        tokio::task::spawn_blocking(move || commit_pair(&dir, &files))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

struct PairFileNames {
    private: String,
    public: String,
    metadata: String,
}

impl PairFileNames {
    fn current() -> Self {
        Self {
            private: PRIVATE_KEY_FILE.to_string(),
            public: PUBLIC_KEY_FILE.to_string(),
            metadata: METADATA_FILE.to_string(),
        }
    }

    fn archived(rotated_at: DateTime<Utc>) -> Self {
        let ts = rotated_at.timestamp();
        Self {
            private: format!("private_key_{}.pem", ts),
            public: format!("public_key_{}.pem", ts),
            metadata: format!("key_meta_{}.json", ts),
        }
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn persist(&self, pair: &SigningKeyPair) -> Result<(), KeyError> {
        self.write_pair(&self.keys_dir, PairFileNames::current(), pair, &pair.metadata())
            .await
            .map_err(|e| KeyError::PersistenceFailed {
                message: format!(
                    "Failed to write key pair to {}: {}",
                    self.keys_dir.display(),
                    e
                ),
            })?;

        info!(
            key_id = %pair.key_id(),
            keys_dir = %self.keys_dir.display(),
            "Persisted signing key pair"
        );
        Ok(())
    }

    async fn load(&self) -> Result<SigningKeyPair, KeyError> {
        let private_path = self.private_key_path();
        let public_path = self.public_key_path();

        let private_pem = Zeroizing::new(read_key_file(&private_path).await?);
        let public_pem = read_key_file(&public_path).await?;

        let metadata = match fs::read(self.metadata_path()).await {
            Ok(bytes) => match serde_json::from_slice::<KeyMetadata>(&bytes) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!(error = %e, "Unreadable key metadata, treating key as initial");
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "Failed to read key metadata, treating key as initial");
                None
            }
        };

        let (key_id, created_at) = match metadata {
            Some(metadata) => (metadata.key_id, metadata.created_at),
            None => (INITIAL_KEY_ID.to_string(), modified_at(&private_path).await),
        };

        let pair = SigningKeyPair::from_pem(key_id, created_at, private_pem, public_pem)?;
        pair.self_test()?;

        debug!(key_id = %pair.key_id(), "Loaded signing key pair from disk");
        Ok(pair)
    }

    async fn archive(
        &self,
        pair: &SigningKeyPair,
        rotated_at: DateTime<Utc>,
    ) -> Result<(), KeyError> {
        let archive_dir = self.archive_dir();
        let archived = pair.archived(rotated_at);

        self.write_pair(
            &archive_dir,
            PairFileNames::archived(rotated_at),
            &archived,
            &archived.metadata(),
        )
        .await
        .map_err(|e| KeyError::PersistenceFailed {
            message: format!(
                "Failed to archive key {} to {}: {}",
                pair.key_id(),
                archive_dir.display(),
                e
            ),
        })?;

        info!(
            key_id = %pair.key_id(),
            archive_dir = %archive_dir.display(),
            "Archived outgoing signing key pair"
        );
        Ok(())
    }
}

async fn read_key_file(path: &Path) -> Result<String, KeyError> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(KeyError::NotFound {
            path: path.display().to_string(),
        }),
        Err(e) => Err(KeyError::PersistenceFailed {
            message: format!("Failed to read {}: {}", path.display(), e),
        }),
    }
}

async fn modified_at(path: &Path) -> DateTime<Utc> {
    match fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => DateTime::<Utc>::from(modified),
        Err(_) => Utc::now(),
    }
}

/// One file of a pair, staged as `<name>.tmp` before the swap
struct PairFile {
    name: String,
    contents: Zeroizing<Vec<u8>>,
    secret: bool,
}

impl PairFile {
    fn new(name: String, contents: &[u8], secret: bool) -> Self {
        Self {
            name,
            contents: Zeroizing::new(contents.to_vec()),
            secret,
        }
    }
}

/// A target already replaced, with the file it displaced
struct Replaced {
    target: PathBuf,
    backup: Option<PathBuf>,
}

fn commit_pair(dir: &Path, files: &[PairFile]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let tmp = dir.join(format!("{}.tmp", file.name));
        if let Err(e) = write_file(&tmp, &file.contents, file.secret) {
            staged.push(tmp);
            discard(&staged);
            return Err(e);
        }
        staged.push(tmp);
    }

    let mut replaced = Vec::with_capacity(files.len());
    for (file, tmp) in files.iter().zip(&staged) {
        let target = dir.join(&file.name);
        match replace(tmp, &target) {
            Ok(backup) => {
                if file.secret {
                    restrict_permissions(&target);
                }
                replaced.push(Replaced { target, backup });
            }
            Err(e) => {
                roll_back(&replaced);
                discard(&staged);
                return Err(e);
            }
        }
    }

    for entry in replaced {
        if let Some(backup) = entry.backup {
            let _ = std::fs::remove_file(backup);
        }
    }
    Ok(())
}

/// Moves `tmp` onto `target`, keeping any previous file as `<target>.bak`
fn replace(tmp: &Path, target: &Path) -> io::Result<Option<PathBuf>> {
    let backup = if target.exists() {
        let mut name = target.as_os_str().to_os_string();
        name.push(".bak");
        let backup = PathBuf::from(name);
        std::fs::rename(target, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = std::fs::rename(tmp, target) {
        if let Some(backup) = &backup {
            let _ = std::fs::rename(backup, target);
        }
        return Err(e);
    }
    Ok(backup)
}

/// Restores replaced targets, newest first
fn roll_back(replaced: &[Replaced]) {
    for entry in replaced.iter().rev() {
        let restored = match &entry.backup {
            Some(backup) => std::fs::rename(backup, &entry.target),
            None => std::fs::remove_file(&entry.target),
        };
        if let Err(e) = restored {
            warn!(
                path = %entry.target.display(),
                error = %e,
                "Failed to roll back key file"
            );
        }
    }
}

fn discard(staged: &[PathBuf]) {
    for tmp in staged {
        match std::fs::remove_file(tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %tmp.display(), error = %e, "Failed to remove staged key file"),
        }
    }
}

fn write_file(path: &Path, contents: &[u8], secret: bool) -> io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;

        if secret {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = secret;

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(
            path = %path.display(),
            error = %e,
            "Failed to restrict private key permissions"
        );
    }
}

#[cfg(not(unix))]
fn restrict_permissions(path: &Path) {
    debug!(
        path = %path.display(),
        "Owner-only permissions are not enforced on this platform"
    );
}
