//! Content-addressed storage: `<cid>/<path>` to bytes.
//!
//! A fetch that fails for any reason is an absent result. Callers decide
//! whether that skips an image, a post or nothing at all.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{FolioError, Result};
use crate::image_loader::{decode_data_uri, decode_image_bytes, ImageProvider, LoadedImage};

pub trait ContentStore {
    fn fetch(&self, path: &str) -> Option<Vec<u8>>;
}

/// Store laid out on disk as `<root>/<cid>/<path>`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Relative, normal components only: no `..`, no absolute paths.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim().trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ContentStore for DirStore {
    fn fetch(&self, path: &str) -> Option<Vec<u8>> {
        let Some(file) = self.resolve(path) else {
            log::warn!("Rejected content path '{}'", path);
            return None;
        };
        match fs::read(&file) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Cannot read {}: {}", file.display(), e);
                None
            }
        }
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        self.files.insert(normalize(path), bytes);
    }
}

impl ContentStore for MemoryStore {
    fn fetch(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(&normalize(path)).cloned()
    }
}

fn normalize(path: &str) -> String {
    path.trim().trim_start_matches('/').to_string()
}

/// A store with nothing in it, for reports without content.
pub struct EmptyStore;

impl ContentStore for EmptyStore {
    fn fetch(&self, _path: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Fetch and decode an image from the store.
pub fn fetch_image(store: &dyn ContentStore, path: &str) -> Result<LoadedImage> {
    let bytes = store
        .fetch(path)
        .ok_or_else(|| FolioError::Content(path.to_string()))?;
    decode_image_bytes(&bytes).map_err(|e| FolioError::Image(format!("{}: {}", path, e)))
}

/// Resolves image URLs relative to one content directory, as post bodies
/// reference their images.
pub struct StoreImages<'a> {
    store: &'a dyn ContentStore,
    dir: String,
}

impl<'a> StoreImages<'a> {
    pub fn new(store: &'a dyn ContentStore, dir: &str) -> Self {
        Self {
            store,
            dir: dir.trim_end_matches('/').to_string(),
        }
    }
}

impl ImageProvider for StoreImages<'_> {
    fn load(&self, url: &str) -> Result<LoadedImage> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }
        if url.contains("://") {
            return Err(FolioError::Image(format!("remote image '{}' not fetched", url)));
        }
        fetch_image(self.store, &format!("{}/{}", self.dir, url.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_1x1() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8).unwrap();
        buf
    }

    #[test]
    fn dir_store_reads_below_root_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cid1/img")).unwrap();
        fs::write(dir.path().join("cid1/img/a.txt"), b"hello").unwrap();

        let store = DirStore::new(dir.path());
        assert_eq!(store.fetch("cid1/img/a.txt"), Some(b"hello".to_vec()));
        assert_eq!(store.fetch("/cid1/img/a.txt"), Some(b"hello".to_vec()));
        assert_eq!(store.fetch("cid1/missing"), None);
        assert_eq!(store.fetch("cid1/../../etc/passwd"), None);
        assert_eq!(store.fetch(""), None);
    }

    #[test]
    fn memory_store_ignores_leading_slash() {
        let mut store = MemoryStore::new();
        store.insert("/cid/x", vec![1, 2]);
        assert_eq!(store.fetch("cid/x"), Some(vec![1, 2]));
        assert_eq!(EmptyStore.fetch("cid/x"), None);
    }

    #[test]
    fn store_images_resolve_relative_to_the_directory() {
        let mut store = MemoryStore::new();
        store.insert("cid1/pics/a.png", png_1x1());
        let images = StoreImages::new(&store, "cid1/");
        let img = images.load("/pics/a.png").unwrap();
        assert_eq!((img.width_px, img.height_px), (1, 1));
        assert!(matches!(images.load("pics/b.png"), Err(FolioError::Content(_))));
        assert!(images.load("https://example.com/a.png").is_err());
    }

    #[test]
    fn undecodable_bytes_are_an_image_error() {
        let mut store = MemoryStore::new();
        store.insert("cid/bad.png", vec![0, 1, 2]);
        assert!(matches!(fetch_image(&store, "cid/bad.png"), Err(FolioError::Image(_))));
    }
}
