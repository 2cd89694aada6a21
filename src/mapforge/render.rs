//! Backend-neutral draw lists. A frame says what to put where on screen; turning it into
//! pixels or widgets is left to whatever shell hosts the editor.

use std::sync::Arc;

use axial::{Layout, Qr};
use glam::DVec2;
use image::RgbaImage;

use crate::{
    common::{
        character::{Character, Characters},
        color::Color,
    },
    mapforge::{
        images::{size_px, ImageCache},
        store::MapStore,
        terrain::{Registry, TerrainId},
        viewport::Viewport,
    },
};

/// Palette thumbnails are this many pixels square.
pub const SWATCH_PX: u32 = 20;

/// Integer axial rectangle worth drawing for the current view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VisibleRange {
    pub q_min: i32,
    pub q_max: i32,
    pub r_min: i32,
    pub r_max: i32,
}

impl VisibleRange {
    /// Bounds of the canvas corners in fractional axial space, widened to whole cells and
    /// padded by `margin` on every side.
    pub fn compute(viewport: &Viewport, layout: &Layout, canvas: DVec2, margin: i32) -> Self {
        let corners = [DVec2::ZERO, DVec2::new(canvas.x, 0.), DVec2::new(0., canvas.y), canvas];
        let (mut q_lo, mut q_hi, mut r_lo, mut r_hi) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for corner in corners {
            let frac = layout.pixel_to_fractional(viewport.screen_to_world(corner));
            q_lo = q_lo.min(frac.q);
            q_hi = q_hi.max(frac.q);
            r_lo = r_lo.min(frac.r);
            r_hi = r_hi.max(frac.r);
        }
        // padded in f64 so far-off views saturate at the i32 range instead of overflowing
        let cell = |v: f64| v.clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        let margin = margin as f64;
        Self {
            q_min: cell(q_lo.floor() - margin),
            q_max: cell(q_hi.ceil() + margin),
            r_min: cell(r_lo.floor() - margin),
            r_max: cell(r_hi.ceil() + margin),
        }
    }

    pub fn contains(&self, qr: Qr) -> bool {
        (self.q_min..=self.q_max).contains(&qr.q) && (self.r_min..=self.r_max).contains(&qr.r)
    }

    /// Every cell in the rectangle, `r` outermost.
    pub fn iter(&self) -> impl Iterator<Item = Qr> {
        let Self { q_min, q_max, r_min, r_max } = *self;
        (r_min..=r_max).flat_map(move |r| (q_min..=q_max).map(move |q| Qr::new(q, r)))
    }

    pub fn len(&self) -> usize {
        let span = |lo: i32, hi: i32| (hi as i64 - lo as i64 + 1).max(0) as usize;
        span(self.q_min, self.q_max).saturating_mul(span(self.r_min, self.r_max))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outline {
    /// Nothing painted
    Empty,
    Terrain,
    /// Painted with an id the registry does not know
    Unknown,
    /// Drawn on top of a terrain image
    OverImage,
}

impl Outline {
    pub fn color(&self) -> &'static str {
        match self {
            Outline::Empty => "#e5e5e5",
            Outline::Terrain => "#6b7280",
            Outline::Unknown => "#FF00FF",
            Outline::OverImage => "#333333",
        }
    }
}

#[derive(Clone, Debug)]
pub struct HexDraw {
    pub qr: Qr,
    pub center: DVec2,
    pub vertices: [DVec2; 6],
    /// `None` when unpainted, unknown, or covered by an image
    pub fill: Option<Color>,
    pub outline: Outline,
    pub line_width: f64,
    /// Centered on `center`
    pub image: Option<Arc<RgbaImage>>,
}

#[derive(Clone, Debug)]
pub enum Token {
    /// Sprite centered on the cell, framed by a white dashed hex outline.
    Sprite { image: Arc<RgbaImage>, outline_width: f64 },
    /// Filled circle with a black outline and the name's first letter in white bold.
    Disc { diameter: f64, fill: &'static str, letter: char, font_size: u32, outline_width: f64 },
}

#[derive(Clone, Debug)]
pub struct CharacterDraw {
    pub id: String,
    pub qr: Qr,
    pub center: DVec2,
    pub vertices: [DVec2; 6],
    pub token: Token,
    pub tooltip: String,
    /// Width of the hover area around `center`
    pub hover_size: f64,
}

#[derive(Clone, Debug)]
pub struct Swatch {
    pub id: TerrainId,
    pub name: String,
    pub color: Color,
    /// Present when the terrain has an image that loaded
    pub thumbnail: Option<Arc<RgbaImage>>,
}

/// One full redraw: hexes first, characters on top.
#[derive(Clone, Debug)]
pub struct Frame {
    pub range: VisibleRange,
    pub hexes: Vec<HexDraw>,
    pub characters: Vec<CharacterDraw>,
}

/// Everything needed to lay out a frame, borrowed from the editor for one pass.
pub struct Painter<'a> {
    pub viewport: &'a Viewport,
    pub store: &'a MapStore,
    pub registry: &'a Registry,
    pub images: &'a mut ImageCache,
}

impl Painter<'_> {
    fn layout(&self) -> Layout {
        *self.store.layout()
    }

    fn screen_vertices(&self, qr: Qr) -> (DVec2, [DVec2; 6]) {
        let world = self.layout().hex_to_pixel(qr);
        (self.viewport.world_to_screen(world), self.store.vertices(qr).map(|v| self.viewport.world_to_screen(v)))
    }

    pub fn hex(&mut self, qr: Qr) -> HexDraw {
        let scale = self.viewport.scale();
        let (center, vertices) = self.screen_vertices(qr);
        let line_width = f64::max(1., 1. / scale);
        let (store, registry, layout) = (self.store, self.registry, self.layout());
        let id = store.get(qr);
        let terrain = id.and_then(|id| registry.get(id));

        let size = size_px(layout.width() * scale, layout.height() * 0.75 * scale);
        let image = terrain.and_then(|t| t.image.as_deref()).and_then(|path| self.images.get(path, Some(size)));

        let (fill, outline) = match (terrain, &image, id) {
            (Some(_), Some(_), _) => (None, Outline::OverImage),
            (Some(terrain), None, _) => (Some(terrain.color.clone()), Outline::Terrain),
            (None, _, Some(_)) => (None, Outline::Unknown),
            (None, _, None) => (None, Outline::Empty),
        };

        HexDraw { qr, center, vertices, fill, outline, line_width, image }
    }

    pub fn character(&mut self, id: &str, character: &Character) -> CharacterDraw {
        let scale = self.viewport.scale();
        let qr = character.position;
        let (center, vertices) = self.screen_vertices(qr);
        let (hex_w, hex_h) = (self.layout().width() * scale, self.layout().height() * scale);

        let sprite = character.sprite().and_then(|path| self.images.get(path, Some(size_px(hex_w, hex_h))));
        let (token, hover_size) = match sprite {
            Some(image) => (Token::Sprite { image, outline_width: f64::max(1., 0.5 * scale) }, hex_w),
            None => {
                let diameter = hex_w * 0.8;
                let token = Token::Disc {
                    diameter,
                    fill: character.class.color(),
                    letter: character.initial(),
                    font_size: u32::max(10, (diameter / 3.) as u32),
                    outline_width: f64::max(1., scale),
                };
                (token, diameter)
            }
        };

        CharacterDraw { id: id.to_owned(), qr, center, vertices, token, tooltip: character.tooltip(), hover_size }
    }

    /// Every cell of `range`, then every character when a roster is given.
    pub fn frame(&mut self, range: VisibleRange, characters: Option<&Characters>) -> Frame {
        let hexes = range.iter().map(|qr| self.hex(qr)).collect();
        let characters = characters.into_iter().flatten().map(|(id, ch)| self.character(id, ch)).collect();
        Frame { range, hexes, characters }
    }

    pub fn palette(&mut self) -> Vec<Swatch> {
        let registry = self.registry;
        registry.iter().map(|(id, terrain)| Swatch {
            thumbnail: terrain.image.as_deref().and_then(|path| self.images.get(path, Some((SWATCH_PX, SWATCH_PX)))),
            id,
            name: terrain.name.clone(),
            color: terrain.color.clone(),
        }).collect()
    }
}
