use super::{CartError, CartItem};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Fixed key the cart snapshot is persisted under. File-backed storage
/// derives its file name from this key.
pub const CART_STORAGE_KEY: &str = "petalworksCart";

/// Snapshot storage for the cart.
///
/// `load` distinguishes "no snapshot" (`Ok(None)`) from real storage
/// failures; a corrupt snapshot counts as no snapshot, never as an error.
pub trait CartStorage: Send + Sync {
    fn load(&self) -> Result<Option<Vec<CartItem>>, CartError>;
    fn save(&self, items: &[CartItem]) -> Result<(), CartError>;
}

/// JSON-file snapshot storage, the session-persistence counterpart of
/// browser local storage.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    /// Storage under the fixed key inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", CART_STORAGE_KEY)),
        }
    }

    /// Storage at an explicit path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self) -> Result<Option<Vec<CartItem>>, CartError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => Ok(Some(items)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding corrupt cart snapshot");
                Ok(None)
            }
        }
    }

    fn save(&self, items: &[CartItem]) -> Result<(), CartError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_string(items)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}
