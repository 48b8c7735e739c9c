//! Key Provisioner - persists accepted public keys.
//!
//! Each accepted key is appended to the trust store (`authorized_keys`) and
//! recorded in its own numbered file inside the tracking directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::KeyStoreConfig;
use crate::error::{ProvisionError, ProvisionResult};
use crate::provision::{DecodedKey, KeyFilesystem};

/// Outcome of a successful provisioning request.
#[derive(Debug, Clone)]
pub struct Provisioned {
    /// The key as persisted, newline terminated.
    pub key: DecodedKey,
    /// Tracking file the key was recorded in.
    ///
    /// `None` when the trust store append succeeded but the tracking file
    /// could not be written; the request still counts as a success.
    pub tracking_file: Option<PathBuf>,
}

impl Provisioned {
    /// Plain-text body returned to the caller.
    pub fn success_text(&self) -> String {
        format!("Key successfully saved:\n{}", self.key.to_text_lossy())
    }
}

/// Appends keys to the trust store and writes tracking files.
pub struct KeyProvisioner {
    fs: Arc<dyn KeyFilesystem>,
    authorized_keys_path: PathBuf,
    tracking_dir: PathBuf,
    tracking_file_prefix: String,
    /// Serializes trust store appends within the process.
    append_lock: Mutex<()>,
}

impl KeyProvisioner {
    pub fn new(fs: Arc<dyn KeyFilesystem>, config: &KeyStoreConfig) -> Self {
        Self {
            fs,
            authorized_keys_path: config.authorized_keys_path.clone(),
            tracking_dir: config.tracking_dir.clone(),
            tracking_file_prefix: config.tracking_file_prefix.clone(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn authorized_keys_path(&self) -> &Path {
        &self.authorized_keys_path
    }

    pub fn tracking_dir(&self) -> &Path {
        &self.tracking_dir
    }

    /// Fail unless the trust store file and the tracking directory exist.
    pub fn check_environment(&self) -> ProvisionResult<()> {
        if self.fs.is_file(&self.authorized_keys_path) && self.fs.is_dir(&self.tracking_dir) {
            return Ok(());
        }

        Err(ProvisionError::EnvironmentNotReady {
            authorized_keys: self.authorized_keys_path.clone(),
            tracking_dir: self.tracking_dir.clone(),
        })
    }

    /// Provision the key carried by a raw request body.
    pub fn provision(&self, body: &[u8]) -> ProvisionResult<Provisioned> {
        self.check_environment()?;

        let key = DecodedKey::from_submission(body)?;

        self.append_to_trust_store(&key)?;

        let tracking_file = match self.write_tracking_file(&key) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    tracking_dir = %self.tracking_dir.display(),
                    "Key added to trust store but tracking file was not written"
                );
                None
            }
        };

        Ok(Provisioned { key, tracking_file })
    }

    fn append_to_trust_store(&self, key: &DecodedKey) -> ProvisionResult<()> {
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.fs
            .append(&self.authorized_keys_path, key.as_bytes())
            .map_err(|e| {
                ProvisionError::io(
                    format!("appending to {}", self.authorized_keys_path.display()),
                    e,
                )
            })
    }

    /// Claim the lowest free `<prefix><n>` name, starting from 1.
    ///
    /// Names are claimed with an exclusive create, so concurrent requests
    /// (threads or processes) never end up sharing a file.
    fn write_tracking_file(&self, key: &DecodedKey) -> ProvisionResult<PathBuf> {
        let mut counter: u64 = 1;

        loop {
            let path = self
                .tracking_dir
                .join(format!("{}{}", self.tracking_file_prefix, counter));

            match self.fs.create_new(&path, key.as_bytes()) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    counter = counter.checked_add(1).ok_or_else(|| {
                        ProvisionError::io(
                            "numbering tracking file",
                            io::Error::other("tracking file counter exhausted"),
                        )
                    })?;
                }
                Err(e) => {
                    return Err(ProvisionError::io(
                        format!("writing {}", path.display()),
                        e,
                    ))
                }
            }
        }
    }
}
