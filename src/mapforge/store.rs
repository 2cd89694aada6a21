//! Painted cells of the map being edited, plus the drag-stroke bookkeeping that keeps a
//! held pointer from repainting the cell it is already over.

use std::path::Path;

use axial::{Layout, Map, Qr};
use glam::DVec2;
use log::{info, warn};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    common::{error::Result, json},
    mapforge::terrain::TerrainId,
};

/// Sparse `cell -> terrain id` store. Ids are not checked against any registry.
#[derive(Clone, Debug, Default)]
pub struct MapStore {
    cells: Map<TerrainId>,
}

impl MapStore {
    pub fn new(layout: Layout) -> Self {
        Self { cells: Map::new(layout) }
    }

    pub fn layout(&self) -> &Layout { self.cells.layout() }

    pub fn get(&self, qr: Qr) -> Option<&TerrainId> {
        self.cells.get(qr)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Qr, &TerrainId)> {
        self.cells.iter().map(|(&qr, id)| (qr, id))
    }

    /// Painted cells adjacent to `qr`.
    pub fn neighbors(&self, qr: Qr) -> Vec<(Qr, &TerrainId)> {
        self.cells.neighbors(qr)
    }

    /// Corners of `qr` in world space.
    pub fn vertices(&self, qr: Qr) -> [DVec2; 6] {
        self.cells.vertices(qr)
    }

    /// Returns true when the cell did not already hold `id`.
    pub fn paint(&mut self, qr: Qr, id: TerrainId) -> bool {
        if self.cells.get(qr) == Some(&id) { return false; }
        self.cells.insert(qr, id);
        true
    }

    /// Returns true when there was something to remove.
    pub fn erase(&mut self, qr: Qr) -> bool {
        self.cells.remove(qr).is_some()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Read a `{"q,r": id}` map file. Keys that are not coordinates and values that are not
    /// ids are skipped with a warning; numeric ids are taken as their decimal string.
    pub fn load(path: &Path, layout: Layout) -> Result<Self> {
        let object = json::read_object(path)?;
        let mut store = Self::new(layout);
        for (key, value) in object {
            let qr = match key.parse::<Qr>() {
                Ok(qr) => qr,
                Err(e) => {
                    warn!("{}: skipping cell: {e}", path.display());
                    continue;
                }
            };
            let id = match value {
                Value::String(s) => TerrainId::from(s),
                Value::Number(n) => TerrainId::from(n.to_string()),
                other => {
                    warn!("{}: skipping cell {qr}, terrain id is {}", path.display(), json::kind(&other));
                    continue;
                }
            };
            store.cells.insert(qr, id);
        }
        info!("loaded {} cells from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        json::write(path, self)?;
        info!("saved {} cells to {}", self.len(), path.display());
        Ok(())
    }
}

impl Serialize for MapStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(qr, id)| (qr.to_string(), id)))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StrokeMode {
    Paint,
    Erase,
}

/// A press-drag-release gesture. Only cell changes are reported while dragging.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stroke {
    mode: Option<StrokeMode>,
    last: Option<Qr>,
}

impl Stroke {
    pub fn begin(&mut self, mode: StrokeMode) {
        self.mode = Some(mode);
        self.last = None;
    }

    /// The pointer is over `qr`. Yields the stroke's mode when this cell was not the last
    /// one handled, or nothing when no stroke is active.
    pub fn enter(&mut self, qr: Qr) -> Option<StrokeMode> {
        let mode = self.mode?;
        if self.last == Some(qr) { return None; }
        self.last = Some(qr);
        Some(mode)
    }

    pub fn end(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> TerrainId {
        TerrainId::from(s)
    }

    // ===== PAINT / ERASE =====

    #[test]
    fn test_paint_is_idempotent() {
        let mut store = MapStore::default();
        assert!(store.paint(Qr::new(2, -1), id("1")));
        assert!(!store.paint(Qr::new(2, -1), id("1")), "repainting the same id should report no change");
        assert!(store.paint(Qr::new(2, -1), id("3")));
        assert_eq!(store.get(Qr::new(2, -1)), Some(&id("3")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_erase_reports_change_only_when_present() {
        let mut store = MapStore::default();
        assert!(!store.erase(Qr::ORIGIN), "erasing an empty cell is a no-op");
        store.paint(Qr::ORIGIN, id("0"));
        assert!(store.erase(Qr::ORIGIN));
        assert_eq!(store.get(Qr::ORIGIN), None);
    }

    #[test]
    fn test_default_store_is_empty() {
        let store = MapStore::default();
        assert!(store.is_empty());
        assert_eq!(*store.layout(), Layout::default());
    }

    #[test]
    fn test_neighbors_are_painted_cells_only() {
        let mut store = MapStore::default();
        store.paint(Qr::new(1, 0), id("1"));
        store.paint(Qr::new(-1, 1), id("3"));
        store.paint(Qr::new(2, 0), id("2"));

        let mut found = store.neighbors(Qr::ORIGIN);
        found.sort();
        assert_eq!(found, vec![(Qr::new(1, 0), &id("1")), (Qr::new(-1, 1), &id("3"))]);
    }

    #[test]
    fn test_unregistered_ids_are_stored() {
        let mut store = MapStore::default();
        assert!(store.paint(Qr::ORIGIN, id("lava")));
        assert_eq!(store.get(Qr::ORIGIN), Some(&id("lava")));
    }

    // ===== FILE FORMAT =====

    #[test]
    fn test_load_erase_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_data.json");
        std::fs::write(&path, json!({ "0,0": "1", "1,0": "3" }).to_string()).unwrap();

        let mut store = MapStore::load(&path, Layout::default()).unwrap();
        assert!(store.erase(Qr::ORIGIN));
        store.save(&path).unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, json!({ "1,0": "3" }));
    }

    #[test]
    fn test_load_skips_bad_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_data.json");
        std::fs::write(&path, json!({
            " -2, 5 ": "2",
            "3,4": 4,
            "nowhere": "1",
            "1,1,1": "1",
            "0,1": [1]
        }).to_string()).unwrap();

        let store = MapStore::load(&path, Layout::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(Qr::new(-2, 5)), Some(&id("2")));
        assert_eq!(store.get(Qr::new(3, 4)), Some(&id("4")), "numeric ids should load as strings");
    }

    #[test]
    fn test_save_is_row_major() {
        let mut store = MapStore::default();
        store.paint(Qr::new(5, 1), id("0"));
        store.paint(Qr::new(-3, 1), id("1"));
        store.paint(Qr::new(0, -2), id("2"));
        let text = serde_json::to_string(&store).unwrap();
        assert_eq!(text, r#"{"0,-2":"2","-3,1":"1","5,1":"0"}"#);
    }

    // ===== STROKES =====

    #[test]
    fn test_stroke_skips_repeated_cell() {
        let mut stroke = Stroke::default();
        assert_eq!(stroke.enter(Qr::ORIGIN), None, "no stroke without a press");

        stroke.begin(StrokeMode::Paint);
        assert_eq!(stroke.enter(Qr::ORIGIN), Some(StrokeMode::Paint));
        assert_eq!(stroke.enter(Qr::ORIGIN), None);
        assert_eq!(stroke.enter(Qr::new(1, 0)), Some(StrokeMode::Paint));
        assert_eq!(stroke.enter(Qr::ORIGIN), Some(StrokeMode::Paint), "returning to a cell counts as entering it");

        stroke.end();
        assert!(!stroke.is_active());
        assert_eq!(stroke.enter(Qr::new(2, 0)), None);
    }

    #[test]
    fn test_begin_resets_last_cell() {
        let mut stroke = Stroke::default();
        stroke.begin(StrokeMode::Erase);
        stroke.enter(Qr::ORIGIN);
        stroke.begin(StrokeMode::Erase);
        assert_eq!(stroke.enter(Qr::ORIGIN), Some(StrokeMode::Erase));
    }
}
