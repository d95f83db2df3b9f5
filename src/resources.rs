use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

/// Synchronous lookup of bundled images by symbolic name.
///
/// A miss is logged and returned as `None`; it never fails the caller.
pub trait IconLoader: Send + Sync {
    fn load(&self, name: &str) -> Option<Vec<u8>>;
}

/// Reads `<root>/<name>.png`.
#[derive(Debug, Clone)]
pub struct DirectoryIconLoader {
    root: PathBuf,
}

impl DirectoryIconLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.png", name))
    }
}

impl IconLoader for DirectoryIconLoader {
    fn load(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Loaded icon {} ({} bytes)", name, bytes.len());
                Some(bytes)
            }
            Err(e) => {
                warn!("Failed to load image named: {} ({:?}: {})", name, path, e);
                None
            }
        }
    }
}

/// Loader for hosts that ship no images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconLoader for NoIcons {
    fn load(&self, name: &str) -> Option<Vec<u8>> {
        debug!("No icon bundle configured, skipping {}", name);
        None
    }
}
