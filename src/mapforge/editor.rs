//! # Editor session
//!
//! Owns everything the map editor mutates: the view, the painted cells, the terrain
//! registry, the current brush, the image cache and a loaded character snapshot. Every
//! mutation queues a [`Change`] describing what needs redrawing; the host drains the queue
//! after handling an input event.

use std::path::Path;

use axial::{Layout, Qr};
use glam::DVec2;
use log::{info, warn};

use crate::{
    common::{
        character::{self, Characters},
        config::Settings,
        error::{Error, Invalid, Result},
        json,
    },
    mapforge::{
        images::{ImageCache, ImageSource},
        render::{Frame, HexDraw, Painter, Swatch, VisibleRange},
        route,
        store::{MapStore, Stroke, StrokeMode},
        terrain::{Registry, TerrainEdit, TerrainId},
        viewport::{Viewport, Zoom},
    },
};

/// What a host has to refresh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Change {
    /// One cell's contents changed
    Cell(Qr),
    /// Pan or zoom; everything on screen moved
    Viewport,
    /// Terrain list or a terrain's look changed
    Terrains,
    /// The whole map was replaced or cleared
    Map,
    Characters,
}

pub struct Editor {
    settings: Settings,
    viewport: Viewport,
    store: MapStore,
    registry: Registry,
    characters: Characters,
    show_characters: bool,
    brush: Option<TerrainId>,
    stroke: Stroke,
    images: ImageCache,
    changes: Vec<Change>,
}

impl Editor {
    /// Default terrains, an empty map, images read from disk.
    pub fn new(settings: Settings) -> Self {
        let images = ImageCache::new(settings.base_dir.clone());
        Self::with_images(settings, images)
    }

    pub fn with_image_source(settings: Settings, source: impl ImageSource + 'static) -> Self {
        let images = ImageCache::with_source(settings.base_dir.clone(), source);
        Self::with_images(settings, images)
    }

    fn with_images(settings: Settings, images: ImageCache) -> Self {
        let mut editor = Self {
            viewport: Viewport::new(&settings),
            store: MapStore::new(Layout::new(settings.hex_size)),
            registry: Registry::defaults(),
            characters: Characters::new(),
            show_characters: false,
            brush: None,
            stroke: Stroke::default(),
            images,
            changes: Vec::new(),
            settings,
        };
        editor.fix_brush();
        editor
    }

    pub fn settings(&self) -> &Settings { &self.settings }
    pub fn viewport(&self) -> &Viewport { &self.viewport }
    pub fn store(&self) -> &MapStore { &self.store }
    pub fn registry(&self) -> &Registry { &self.registry }
    pub fn characters(&self) -> &Characters { &self.characters }
    pub fn brush(&self) -> Option<&TerrainId> { self.brush.as_ref() }
    pub fn show_characters(&self) -> bool { self.show_characters }

    pub fn layout(&self) -> &Layout { self.store.layout() }

    /// Changes queued since the last drain, oldest first.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    // ===== VIEW =====

    /// Cell under a screen point.
    pub fn hex_at(&self, screen: DVec2) -> Qr {
        self.layout().pixel_to_hex(self.viewport.screen_to_world(screen))
    }

    pub fn pan_by(&mut self, delta: DVec2) {
        self.viewport.pan_by(delta);
        self.changes.push(Change::Viewport);
    }

    pub fn zoom_at(&mut self, anchor: DVec2, zoom: Zoom) -> bool {
        let changed = self.viewport.zoom_at(anchor, zoom);
        if changed { self.changes.push(Change::Viewport); }
        changed
    }

    pub fn center_on(&mut self, canvas: DVec2) {
        self.viewport.center_on(canvas);
        self.changes.push(Change::Viewport);
    }

    pub fn set_view(&mut self, offset: DVec2, scale: f64) {
        self.viewport.set(offset, scale);
        self.changes.push(Change::Viewport);
    }

    pub fn set_show_characters(&mut self, show: bool) {
        if self.show_characters == show { return; }
        self.show_characters = show;
        self.changes.push(Change::Characters);
    }

    // ===== BRUSH AND STROKES =====

    /// Pick the terrain new strokes paint with. The erase id is always accepted.
    pub fn select_brush(&mut self, id: TerrainId) -> std::result::Result<(), Invalid> {
        if !id.is_erase() && !self.registry.contains(&id) {
            return Err(Invalid::UnknownTerrain(id.to_string()));
        }
        self.brush = Some(id);
        Ok(())
    }

    /// Keep the brush if it still exists, else the configured default, else the lowest id.
    fn fix_brush(&mut self) {
        if self.brush.as_ref().is_some_and(|b| b.is_erase() || self.registry.contains(b)) { return; }
        let default = TerrainId::from(self.settings.default_brush.as_str());
        self.brush = if self.registry.contains(&default) {
            Some(default)
        } else {
            self.registry.ids().next()
        };
    }

    /// Start a stroke and apply it to the cell under the pointer.
    pub fn press(&mut self, mode: StrokeMode, screen: DVec2) -> bool {
        self.stroke.begin(mode);
        self.drag(screen)
    }

    /// Continue the active stroke. Staying inside the same cell does nothing.
    pub fn drag(&mut self, screen: DVec2) -> bool {
        let qr = self.hex_at(screen);
        match self.stroke.enter(qr) {
            Some(StrokeMode::Paint) => self.paint(qr),
            Some(StrokeMode::Erase) => self.erase(qr),
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.stroke.end();
    }

    /// Apply the current brush to one cell. An erase brush erases; no brush does nothing.
    pub fn paint(&mut self, qr: Qr) -> bool {
        let changed = match self.brush.clone() {
            Some(id) if id.is_erase() => self.store.erase(qr),
            Some(id) => self.store.paint(qr, id),
            None => false,
        };
        if changed { self.changes.push(Change::Cell(qr)); }
        changed
    }

    pub fn erase(&mut self, qr: Qr) -> bool {
        let changed = self.store.erase(qr);
        if changed { self.changes.push(Change::Cell(qr)); }
        changed
    }

    pub fn clear_map(&mut self) {
        self.store.clear();
        self.stroke.end();
        info!("map cleared");
        self.changes.push(Change::Map);
    }

    // ===== TERRAINS =====

    pub fn add_terrain(&mut self, name: &str, color: &str) -> std::result::Result<TerrainId, Invalid> {
        let id = self.registry.add(name, color)?;
        self.changes.push(Change::Terrains);
        Ok(id)
    }

    /// Edit a terrain in place. Cached renderings of its old image are dropped.
    pub fn update_terrain(&mut self, id: &TerrainId, edit: TerrainEdit) -> std::result::Result<(), Invalid> {
        let old = self.registry.update(id, edit)?;
        if let Some(path) = old.image.as_deref() { self.images.invalidate(path); }
        self.changes.push(Change::Terrains);
        Ok(())
    }

    /// Replace the registry from a file. On failure the defaults are used and the error is
    /// handed back for the caller to report; the session stays usable either way.
    pub fn load_terrains(&mut self, path: &Path) -> Result<()> {
        let loaded = Registry::load(path);
        let result = match loaded {
            Ok(registry) => {
                self.registry = registry;
                Ok(())
            }
            Err(e) => {
                warn!("{e}; using default terrains");
                self.registry = Registry::defaults();
                Err(e)
            }
        };
        self.images.clear();
        self.fix_brush();
        self.changes.push(Change::Terrains);
        result
    }

    pub fn save_terrains(&self, path: &Path) -> Result<()> {
        self.registry.save(path)
    }

    // ===== MAP FILE =====

    /// Replace the map from a file; on failure the map is left empty and the error returned.
    pub fn load_map(&mut self, path: &Path) -> Result<()> {
        let layout = *self.layout();
        let result = match MapStore::load(path, layout) {
            Ok(store) => {
                self.store = store;
                Ok(())
            }
            Err(e) => {
                warn!("{e}; starting with an empty map");
                self.store = MapStore::new(layout);
                Err(e)
            }
        };
        self.stroke.end();
        self.changes.push(Change::Map);
        result
    }

    pub fn save_map(&self, path: &Path) -> Result<()> {
        self.store.save(path)
    }

    /// Load both data files ahead of an edit that will be written back. A missing file
    /// starts from the defaults; any other failure is returned so the caller can stop
    /// before overwriting a file it could not read.
    pub fn load_for_edit(&mut self, terrains: &Path, map: &Path) -> Result<()> {
        fn missing_ok(result: Result<()>) -> Result<()> {
            match result {
                Err(e) if e.is_not_found() => Ok(()),
                other => other,
            }
        }
        missing_ok(self.load_terrains(terrains))?;
        missing_ok(self.load_map(map))
    }

    // ===== CHARACTERS =====

    /// Load a character snapshot, exported or bare, and switch character display on.
    /// On failure no characters are shown.
    pub fn load_characters(&mut self, path: &Path) -> Result<usize> {
        let loaded = json::read(path).and_then(|doc| {
            character::from_document(doc).map_err(|e| Error::format(path, e.to_string()))
        });
        self.changes.push(Change::Characters);
        match loaded {
            Ok(characters) => {
                info!("loaded {} characters from {}", characters.len(), path.display());
                self.characters = characters;
                self.show_characters = true;
                Ok(self.characters.len())
            }
            Err(e) => {
                warn!("{e}");
                self.characters.clear();
                Err(e)
            }
        }
    }

    // ===== DRAWING =====

    fn painter(&mut self) -> Painter<'_> {
        self.painter_and_characters().0
    }

    /// A painter plus the characters to draw, borrowed side by side.
    fn painter_and_characters(&mut self) -> (Painter<'_>, Option<&Characters>) {
        let painter = Painter { viewport: &self.viewport, store: &self.store, registry: &self.registry, images: &mut self.images };
        (painter, self.show_characters.then_some(&self.characters))
    }

    pub fn visible_range(&self, canvas: DVec2) -> VisibleRange {
        VisibleRange::compute(&self.viewport, self.layout(), canvas, self.settings.render_margin)
    }

    /// Full redraw of a `canvas`-sized view.
    pub fn frame(&mut self, canvas: DVec2) -> Frame {
        let range = self.visible_range(canvas);
        let (mut painter, characters) = self.painter_and_characters();
        painter.frame(range, characters)
    }

    /// Redraw of a single cell after a [`Change::Cell`].
    pub fn redraw(&mut self, qr: Qr) -> HexDraw {
        self.painter().hex(qr)
    }

    pub fn palette(&mut self) -> Vec<Swatch> {
        self.painter().palette()
    }

    // ===== ROUTING =====

    pub fn route(&self, from: Qr, to: Qr) -> Option<(Vec<Qr>, u32)> {
        route::route(&self.store, &self.registry, from, to)
    }
}
