//! Decoded terrain and sprite images, cached per `(path, size)` for the life of a session.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{imageops::FilterType, RgbaImage};
use log::{debug, warn};

use crate::common::error::{Error, Result};

/// Target box in pixels. `None` keeps the image at its natural size.
pub type Size = Option<(u32, u32)>;

type Key = (PathBuf, Size);

/// Decodes an image file, optionally shrunk to fit a box.
pub trait ImageSource {
    fn load(&self, path: &Path, size: Size) -> Result<RgbaImage>;
}

/// Reads from disk with the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImages;

impl ImageSource for FsImages {
    fn load(&self, path: &Path, size: Size) -> Result<RgbaImage> {
        if !path.exists() { return Err(Error::ImageNotFound(path.to_owned())); }
        let img = image::open(path)
            .map_err(|source| Error::Image { path: path.to_owned(), source })?
            .to_rgba8();
        Ok(match size {
            Some(bounds) => fit(img, bounds),
            None => img,
        })
    }
}

/// Shrink to fit inside `bounds` keeping the aspect ratio. Never enlarges.
pub fn fit(img: RgbaImage, (max_w, max_h): (u32, u32)) -> RgbaImage {
    let (w, h) = img.dimensions();
    let (max_w, max_h) = (max_w.max(1), max_h.max(1));
    if w <= max_w && h <= max_h { return img; }

    let ratio = f64::min(max_w as f64 / w as f64, max_h as f64 / h as f64);
    let new_w = ((w as f64 * ratio).round() as u32).clamp(1, max_w);
    let new_h = ((h as f64 * ratio).round() as u32).clamp(1, max_h);
    image::imageops::resize(&img, new_w, new_h, FilterType::Lanczos3)
}

/// Pixel box for a draw size in screen units, truncated; at least one pixel each way.
pub fn size_px(w: f64, h: f64) -> (u32, u32) {
    (w.max(1.) as u32, h.max(1.) as u32)
}

/// Unbounded cache in front of an [`ImageSource`].
///
/// Paths are resolved against `base_dir` before they become keys, so `tiles/a.png` and
/// `./tiles/a.png` are distinct entries. Failed loads are remembered and not retried until
/// the cache is cleared or the path is invalidated.
pub struct ImageCache {
    base_dir: PathBuf,
    source: Box<dyn ImageSource>,
    loaded: HashMap<Key, Arc<RgbaImage>>,
    failed: HashSet<Key>,
}

impl ImageCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_source(base_dir, FsImages)
    }

    pub fn with_source(base_dir: impl Into<PathBuf>, source: impl ImageSource + 'static) -> Self {
        Self {
            base_dir: base_dir.into(),
            source: Box::new(source),
            loaded: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() { path.to_owned() } else { self.base_dir.join(path) }
    }

    /// The decoded image, or `None` when there is no path or it cannot be loaded.
    pub fn get(&mut self, path: &str, size: Size) -> Option<Arc<RgbaImage>> {
        if path.trim().is_empty() { return None; }
        let key = (self.resolve(path), size);
        if let Some(img) = self.loaded.get(&key) { return Some(img.clone()); }
        if self.failed.contains(&key) { return None; }

        match self.source.load(&key.0, size) {
            Ok(img) => {
                debug!("cached {} at {size:?}", key.0.display());
                let img = Arc::new(img);
                self.loaded.insert(key, img.clone());
                Some(img)
            }
            Err(e) => {
                warn!("{e}");
                self.failed.insert(key);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn clear(&mut self) {
        debug!("dropping {} cached images", self.loaded.len());
        self.loaded.clear();
        self.failed.clear();
    }

    /// Forget every size of one image, e.g. after its terrain points somewhere else.
    pub fn invalidate(&mut self, path: &str) {
        let resolved = self.resolve(path);
        let before = self.loaded.len();
        self.loaded.retain(|(p, _), _| *p != resolved);
        self.failed.retain(|(p, _)| *p != resolved);
        debug!("invalidated {} cached sizes of {}", before - self.loaded.len(), resolved.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    use image::Rgba;

    /// Records every load and hands back a 4x4 image, or fails for names containing "bad".
    #[derive(Clone, Default)]
    struct Fake {
        calls: Rc<RefCell<Vec<Key>>>,
    }

    impl ImageSource for Fake {
        fn load(&self, path: &Path, size: Size) -> Result<RgbaImage> {
            self.calls.borrow_mut().push((path.to_owned(), size));
            if path.to_string_lossy().contains("bad") {
                return Err(Error::ImageNotFound(path.to_owned()));
            }
            Ok(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])))
        }
    }

    fn cache() -> (ImageCache, Rc<RefCell<Vec<Key>>>) {
        let fake = Fake::default();
        let calls = fake.calls.clone();
        (ImageCache::with_source("/base", fake), calls)
    }

    // ===== CACHING =====

    #[test]
    fn test_hit_does_not_reload() {
        let (mut cache, calls) = cache();
        assert!(cache.get("tiles/grass.png", None).is_some());
        assert!(cache.get("tiles/grass.png", None).is_some());
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(calls.borrow()[0].0, PathBuf::from("/base/tiles/grass.png"));
    }

    #[test]
    fn test_sizes_are_separate_entries() {
        let (mut cache, calls) = cache();
        cache.get("a.png", None);
        cache.get("a.png", Some((20, 20)));
        cache.get("a.png", Some((52, 45)));
        assert_eq!(calls.borrow().len(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_blank_path_is_no_image() {
        let (mut cache, calls) = cache();
        assert!(cache.get("  ", None).is_none());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_failure_is_remembered() {
        let (mut cache, calls) = cache();
        assert!(cache.get("bad.png", None).is_none());
        assert!(cache.get("bad.png", None).is_none());
        assert_eq!(calls.borrow().len(), 1, "a failed path should not be retried");

        cache.clear();
        assert!(cache.get("bad.png", None).is_none());
        assert_eq!(calls.borrow().len(), 2);
    }

    // ===== INVALIDATION =====

    #[test]
    fn test_invalidate_only_matching_path() {
        let (mut cache, _) = cache();
        cache.get("a.png", None);
        cache.get("a.png", Some((20, 20)));
        cache.get("b.png", None);

        cache.invalidate("a.png");
        assert_eq!(cache.len(), 1);
        assert!(cache.loaded.contains_key(&(PathBuf::from("/base/b.png"), None)));
    }

    #[test]
    fn test_clear_drops_everything() {
        let (mut cache, _) = cache();
        cache.get("a.png", None);
        cache.get("b.png", None);
        cache.clear();
        assert!(cache.is_empty());
    }

    // ===== FILESYSTEM =====

    #[test]
    fn test_fs_images_decode_and_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbaImage::from_pixel(40, 10, Rgba([200, 10, 10, 255])).save(&path).unwrap();

        let mut cache = ImageCache::new(dir.path());
        let full = cache.get("wide.png", None).unwrap();
        assert_eq!(full.dimensions(), (40, 10));

        let thumb = cache.get("wide.png", Some((20, 20))).unwrap();
        assert_eq!(thumb.dimensions(), (20, 5), "aspect ratio should be kept");

        let small = cache.get("wide.png", Some((100, 100))).unwrap();
        assert_eq!(small.dimensions(), (40, 10), "images are never enlarged");
    }

    #[test]
    fn test_fs_images_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(FsImages.load(&dir.path().join("nope.png"), None), Err(Error::ImageNotFound(_))));

        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"definitely not a png").unwrap();
        assert!(matches!(FsImages.load(&junk, None), Err(Error::Image { .. })));

        let mut cache = ImageCache::new(dir.path());
        assert!(cache.get("junk.png", None).is_none(), "decode failure falls back to no image");
    }

    #[test]
    fn test_size_px_truncates_and_floors_at_one() {
        assert_eq!(size_px(51.96, 45.0), (51, 45));
        assert_eq!(size_px(0.2, -3.), (1, 1));
    }
}
