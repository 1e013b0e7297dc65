use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageReader, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{debug, warn};

use crate::asset_keys::{validate_asset_key, AssetKeyError};
use crate::world::{ImageId, ImageRef};

const PLACEHOLDER_COLOR: [u8; 4] = [255, 0, 255, 255];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {key} (searched {searched})")]
    AssetNotFound { key: String, searched: PathBuf },
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AssetError {
    pub fn key_not_found(key: &str) -> Self {
        Self::AssetNotFound {
            key: key.to_string(),
            searched: PathBuf::new(),
        }
    }
}

/// What to do when an asset key cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingAssetPolicy {
    #[default]
    Abort,
    /// Substitute a solid tile-sized box and warn once per key.
    Placeholder,
}

/// Owns every decoded image; tiles only hold [`ImageId`]s into it.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<RgbaImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: RgbaImage) -> ImageId {
        let id = ImageId(self.images.len() as u32);
        self.images.push(image);
        id
    }

    pub fn get(&self, id: ImageId) -> Option<&RgbaImage> {
        self.images.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Resolves animation and image keys to decoded frames.
pub trait AssetProvider {
    /// Ordered, non-empty frame list for `key`.
    fn frames(&mut self, key: &str) -> Result<Vec<ImageRef>, AssetError>;

    fn image(&mut self, key: &str) -> Result<ImageRef, AssetError> {
        self.frames(key)?
            .first()
            .copied()
            .ok_or_else(|| AssetError::key_not_found(key))
    }

    fn images(&self) -> &ImageStore;
}

/// Loads PNGs from a graphics directory, scaling each to the tile size.
///
/// A key resolves to the PNG files inside directory `<key>/`, ordered by
/// numeric file stem, or else to the single file `<key>.png`.
#[derive(Debug)]
pub struct FsAssetProvider {
    graphics_dir: PathBuf,
    tile_size: u32,
    policy: MissingAssetPolicy,
    store: ImageStore,
    cache: HashMap<String, Vec<ImageRef>>,
    placeholder: Option<ImageRef>,
    warned_missing_keys: HashSet<String>,
}

impl FsAssetProvider {
    pub fn new(graphics_dir: PathBuf, tile_size: u32, policy: MissingAssetPolicy) -> Self {
        Self {
            graphics_dir,
            tile_size: tile_size.max(1),
            policy,
            store: ImageStore::new(),
            cache: HashMap::new(),
            placeholder: None,
            warned_missing_keys: HashSet::new(),
        }
    }

    pub fn graphics_dir(&self) -> &Path {
        &self.graphics_dir
    }

    pub fn policy(&self) -> MissingAssetPolicy {
        self.policy
    }

    fn load_frames(&mut self, key: &str) -> Result<Vec<ImageRef>, AssetError> {
        let paths = resolve_frame_paths(&self.graphics_dir, key)?;
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let image = load_scaled_rgba(&path, self.tile_size)?;
            frames.push(ImageRef::new(self.store.insert(image)));
        }
        debug!(asset_key = key, frames = frames.len(), "asset_loaded");
        Ok(frames)
    }

    fn placeholder(&mut self) -> ImageRef {
        if let Some(placeholder) = self.placeholder {
            return placeholder;
        }
        let size = self.tile_size;
        let image = RgbaImage::from_pixel(size, size, Rgba(PLACEHOLDER_COLOR));
        let placeholder = ImageRef::new(self.store.insert(image));
        self.placeholder = Some(placeholder);
        placeholder
    }
}

impl AssetProvider for FsAssetProvider {
    fn frames(&mut self, key: &str) -> Result<Vec<ImageRef>, AssetError> {
        validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        if let Some(frames) = self.cache.get(key) {
            return Ok(frames.clone());
        }

        let frames = match self.load_frames(key) {
            Ok(frames) => frames,
            Err(error) if self.policy == MissingAssetPolicy::Placeholder => {
                warn_missing_asset_once(&mut self.warned_missing_keys, key, &error);
                vec![self.placeholder()]
            }
            Err(error) => return Err(error),
        };
        self.cache.insert(key.to_string(), frames.clone());
        Ok(frames)
    }

    fn images(&self) -> &ImageStore {
        &self.store
    }
}

fn resolve_frame_paths(graphics_dir: &Path, key: &str) -> Result<Vec<PathBuf>, AssetError> {
    let frame_dir = graphics_dir.join(key);
    if frame_dir.is_dir() {
        let entries = fs::read_dir(&frame_dir).map_err(|source| AssetError::Io {
            path: frame_dir.clone(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AssetError::Io {
                path: frame_dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if is_png && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by_key(|path| frame_order(path));
        if !paths.is_empty() {
            return Ok(paths);
        }
    }

    let single = graphics_dir.join(format!("{key}.png"));
    if single.is_file() {
        return Ok(vec![single]);
    }
    Err(AssetError::AssetNotFound {
        key: key.to_string(),
        searched: frame_dir,
    })
}

/// Numbered frames first, in numeric order, then everything else by name.
fn frame_order(path: &Path) -> (u64, String) {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let number = stem.parse::<u64>().unwrap_or(u64::MAX);
    (number, stem)
}

fn load_scaled_rgba(path: &Path, tile_size: u32) -> Result<RgbaImage, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    if image.width() == tile_size && image.height() == tile_size {
        return Ok(image);
    }
    Ok(imageops::resize(&image, tile_size, tile_size, FilterType::Nearest))
}

fn warn_missing_asset_once(warned_keys: &mut HashSet<String>, key: &str, error: &AssetError) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    warn!(asset_key = key, reason = %error, "asset_load_failed_using_placeholder");
}
