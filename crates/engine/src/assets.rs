use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::asset_names::{validate_asset_name, AssetNameError};
use crate::surface::{Surface, SurfaceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Sprite,
    Tileset,
    Banner,
    Map,
}

impl AssetKind {
    pub const fn folder(self) -> &'static str {
        match self {
            AssetKind::Sprite => "sprites",
            AssetKind::Tileset => "tiles",
            AssetKind::Banner => "banners",
            AssetKind::Map => "maps",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub kind: AssetKind,
    pub name: String,
}

impl AssetKey {
    pub fn new(kind: AssetKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: AssetNameError,
    },
    #[error(transparent)]
    Image(#[from] SurfaceError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("asset {kind:?}/{name} failed to load earlier")]
    PreviouslyFailed { kind: AssetKind, name: String },
}

/// Load-once image store keyed by `(kind, file name)`.
///
/// Images are scaled by `scale` and colour keyed on load. Failed loads are
/// remembered so a missing file is only reported once.
#[derive(Debug)]
pub struct AssetCache {
    root: PathBuf,
    scale: u32,
    color_key: Option<[u8; 3]>,
    images: HashMap<AssetKey, Option<Arc<Surface>>>,
    warned: HashSet<AssetKey>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>, scale: u32, color_key: Option<[u8; 3]>) -> Self {
        Self {
            root: root.into(),
            scale: scale.max(1),
            color_key,
            images: HashMap::new(),
            warned: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn path_for(&self, kind: AssetKind, name: &str) -> Result<PathBuf, AssetError> {
        validate_asset_name(name).map_err(|source| AssetError::InvalidName {
            name: name.to_string(),
            source,
        })?;
        Ok(self.root.join(kind.folder()).join(name))
    }

    /// Registers an already decoded image, replacing any cached entry.
    pub fn insert(&mut self, kind: AssetKind, name: &str, surface: Surface) -> Arc<Surface> {
        let image = Arc::new(surface);
        self.images
            .insert(AssetKey::new(kind, name), Some(Arc::clone(&image)));
        image
    }

    /// Returns the cached image or loads it, propagating the failure.
    pub fn image(&mut self, kind: AssetKind, name: &str) -> Result<Arc<Surface>, AssetError> {
        let key = AssetKey::new(kind, name);
        if let Some(cached) = self.images.get(&key) {
            return cached
                .as_ref()
                .map(Arc::clone)
                .ok_or_else(|| AssetError::PreviouslyFailed {
                    kind,
                    name: name.to_string(),
                });
        }

        let loaded = self
            .path_for(kind, name)
            .and_then(|path| Ok(Surface::load(&path, self.scale, self.color_key)?));
        match loaded {
            Ok(surface) => {
                debug!(kind = ?kind, name, width = surface.width(), height = surface.height(), "asset_loaded");
                let image = Arc::new(surface);
                self.images.insert(key, Some(Arc::clone(&image)));
                Ok(image)
            }
            Err(error) => {
                self.images.insert(key, None);
                Err(error)
            }
        }
    }

    /// Like [`AssetCache::image`] but logs the first failure per key and
    /// returns `None`.
    pub fn optional_image(&mut self, kind: AssetKind, name: &str) -> Option<Arc<Surface>> {
        match self.image(kind, name) {
            Ok(image) => Some(image),
            Err(error) => {
                let key = AssetKey::new(kind, name);
                if self.warned.insert(key) {
                    warn!(kind = ?kind, name, error = %error, "asset_load_failed");
                }
                None
            }
        }
    }

    pub fn read_text(&self, kind: AssetKind, name: &str) -> Result<String, AssetError> {
        let path = self.path_for(kind, name)?;
        fs::read_to_string(&path).map_err(|source| AssetError::Read { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn inserted_images_are_shared() {
        let mut cache = AssetCache::new("unused", 2, None);
        let inserted = cache.insert(AssetKind::Sprite, "coin-frames.png", Surface::new(4, 4));

        let fetched = cache
            .image(AssetKind::Sprite, "coin-frames.png")
            .expect("cached image");

        assert!(Arc::ptr_eq(&inserted, &fetched));
    }

    #[test]
    fn missing_image_fails_once_then_reports_previous_failure() {
        let dir = TempDir::new().expect("temp dir");
        let mut cache = AssetCache::new(dir.path(), 1, None);

        let first = cache.image(AssetKind::Sprite, "missing.png");
        let second = cache.image(AssetKind::Sprite, "missing.png");

        assert!(matches!(first, Err(AssetError::Image(SurfaceError::Open { .. }))));
        assert!(matches!(second, Err(AssetError::PreviouslyFailed { .. })));
        assert!(cache.optional_image(AssetKind::Sprite, "missing.png").is_none());
    }

    #[test]
    fn traversal_names_are_rejected_before_touching_disk() {
        let cache = AssetCache::new("root", 1, None);
        let result = cache.path_for(AssetKind::Map, "../secret.map");
        assert!(matches!(result, Err(AssetError::InvalidName { .. })));
    }

    #[test]
    fn read_text_resolves_kind_folder() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("maps")).expect("maps dir");
        fs::write(dir.path().join("maps").join("central.map"), "0,0 [1]\n").expect("write map");
        let cache = AssetCache::new(dir.path(), 1, None);

        let text = cache
            .read_text(AssetKind::Map, "central.map")
            .expect("map text");

        assert_eq!(text, "0,0 [1]\n");
    }
}
