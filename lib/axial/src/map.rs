//! # Map: sparse hex storage with pixel-space conversion
//!
//! Stores values at axial cells and owns the [`Layout`] that places those cells on a
//! plane. Cells that were never inserted are simply absent; there is no background value.
//!
//! ```rust
//! use axial::{Layout, Map, Qr};
//!
//! let mut map: Map<&str> = Map::new(Layout::new(30.));
//! map.insert(Qr::new(1, 2), "grass");
//! map.insert(Qr::new(2, 2), "forest");
//!
//! let cell = map.layout().pixel_to_hex(map.layout().hex_to_pixel(Qr::new(1, 2)));
//! assert_eq!(map.get(cell), Some(&"grass"));
//! assert_eq!(map.neighbors(cell), vec![(Qr::new(2, 2), &"forest")]);
//! ```

use std::collections::{BTreeMap, HashMap};

use derive_more::IntoIterator;
use glam::DVec2;

use crate::{layout::Layout, qr::Qr};

/// A sparse hexagonal tile map
///
/// - `tree`: BTreeMap for row-major iteration
/// - `hash`: HashMap for O(1) lookup
#[derive(Clone, Debug, IntoIterator)]
pub struct Map<T> {
    layout: Layout,
    #[into_iterator(owned, ref)]
    tree: BTreeMap<Qr, T>,
    hash: HashMap<Qr, T>,
}

impl<T> Default for Map<T> {
    fn default() -> Self {
        Self { layout: Layout::default(), tree: BTreeMap::new(), hash: HashMap::new() }
    }
}

impl<T> Map<T>
where T: Clone {
    pub fn new(layout: Layout) -> Self {
        Self { layout, tree: BTreeMap::new(), hash: HashMap::new() }
    }

    pub fn layout(&self) -> &Layout { &self.layout }

    pub fn get(&self, qr: Qr) -> Option<&T> {
        self.hash.get(&qr)
    }

    pub fn contains(&self, qr: Qr) -> bool {
        self.hash.contains_key(&qr)
    }

    /// Returns the value previously stored at `qr`, if any.
    pub fn insert(&mut self, qr: Qr, obj: T) -> Option<T> {
        self.tree.insert(qr, obj.clone());
        self.hash.insert(qr, obj)
    }

    pub fn remove(&mut self, qr: Qr) -> Option<T> {
        self.tree.remove(&qr);
        self.hash.remove(&qr)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.hash.clear();
    }

    pub fn len(&self) -> usize {
        self.hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }

    /// Occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (&Qr, &T)> {
        self.tree.iter()
    }

    pub fn vertices(&self, qr: Qr) -> [DVec2; 6] {
        self.layout.vertices(self.layout.hex_to_pixel(qr))
    }

    /// Occupied cells adjacent to `qr`.
    pub fn neighbors(&self, qr: Qr) -> Vec<(Qr, &T)> {
        qr.neighbors().into_iter()
            .filter_map(|n| self.get(n).map(|obj| (n, obj)))
            .collect()
    }
}
