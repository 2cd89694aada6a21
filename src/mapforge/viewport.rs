use glam::DVec2;

use crate::common::config::Settings;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Zoom {
    In,
    Out,
}

/// Pan and uniform zoom between world space (hex geometry) and screen pixels.
///
/// `screen = world * scale + offset`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    offset: DVec2,
    scale: f64,
    step: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Viewport {
    pub fn new(settings: &Settings) -> Self {
        Self {
            offset: DVec2::ZERO,
            scale: 1.,
            step: settings.zoom_step,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
        }
    }

    pub fn offset(&self) -> DVec2 { self.offset }
    pub fn scale(&self) -> f64 { self.scale }
    pub fn zoom_bounds(&self) -> (f64, f64) { (self.min_zoom, self.max_zoom) }

    /// Place the view explicitly; the scale is clamped into the zoom bounds.
    pub fn set(&mut self, offset: DVec2, scale: f64) {
        self.offset = offset;
        self.scale = scale.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        world * self.scale + self.offset
    }

    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        (screen - self.offset) / self.scale
    }

    /// Translate by a screen-space delta. Unbounded.
    pub fn pan_by(&mut self, delta: DVec2) {
        self.offset += delta;
    }

    /// Put the world origin in the middle of a canvas.
    pub fn center_on(&mut self, canvas: DVec2) {
        self.offset = canvas / 2.;
    }

    /// Zoom one step about `anchor`, keeping the world point under it fixed on screen.
    /// Returns false, leaving the view untouched, when the scale is already at the bound.
    pub fn zoom_at(&mut self, anchor: DVec2, zoom: Zoom) -> bool {
        let factor = match zoom {
            Zoom::In => self.step,
            Zoom::Out => 1. / self.step,
        };
        let scale = (self.scale * factor).clamp(self.min_zoom, self.max_zoom);
        if scale == self.scale { return false; }

        let world = self.screen_to_world(anchor);
        self.scale = scale;
        self.offset = anchor - world * scale;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: DVec2, b: DVec2, what: &str) {
        assert!((a - b).length() < EPSILON, "{what}: {a:?} vs {b:?}");
    }

    fn skewed() -> Viewport {
        let mut viewport = Viewport::default();
        viewport.set(DVec2::new(-317.25, 88.5), 2.3);
        viewport
    }

    // ===== TRANSFORM =====

    #[test]
    fn test_identity_at_start() {
        let viewport = Viewport::default();
        let p = DVec2::new(12.5, -40.);
        assert_eq!(viewport.world_to_screen(p), p);
        assert_eq!(viewport.screen_to_world(p), p);
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let viewport = skewed();
        for p in [DVec2::ZERO, DVec2::new(640., 480.), DVec2::new(-13.7, 9001.3)] {
            assert_close(viewport.world_to_screen(viewport.screen_to_world(p)), p, "roundtrip");
        }
    }

    #[test]
    fn test_world_to_screen_formula() {
        let viewport = skewed();
        let s = viewport.world_to_screen(DVec2::new(10., 20.));
        assert_close(s, DVec2::new(10. * 2.3 - 317.25, 20. * 2.3 + 88.5), "formula");
    }

    // ===== PAN =====

    #[test]
    fn test_pan_moves_offset_only() {
        let mut viewport = skewed();
        let before = viewport.screen_to_world(DVec2::new(100., 100.));
        viewport.pan_by(DVec2::new(23., -7.));
        assert_eq!(viewport.scale(), 2.3);
        let after = viewport.screen_to_world(DVec2::new(123., 93.));
        assert_close(after, before, "panned content should follow the pointer");
    }

    #[test]
    fn test_center_on() {
        let mut viewport = Viewport::default();
        viewport.center_on(DVec2::new(800., 600.));
        assert_eq!(viewport.world_to_screen(DVec2::ZERO), DVec2::new(400., 300.));
    }

    // ===== ZOOM =====

    #[test]
    fn test_zoom_in_keeps_anchor() {
        let mut viewport = skewed();
        let anchor = DVec2::new(321., 123.);
        let before = viewport.screen_to_world(anchor);

        assert!(viewport.zoom_at(anchor, Zoom::In));
        assert!((viewport.scale() - 2.3 * 1.1).abs() < EPSILON);
        assert_close(viewport.screen_to_world(anchor), before, "anchor after zoom in");

        assert!(viewport.zoom_at(anchor, Zoom::Out));
        assert_close(viewport.screen_to_world(anchor), before, "anchor after zoom out");
    }

    #[test]
    fn test_zoom_clamps_to_bounds() {
        let mut viewport = Viewport::default();
        let anchor = DVec2::new(50., 50.);
        for _ in 0..200 { viewport.zoom_at(anchor, Zoom::In); }
        assert_eq!(viewport.scale(), 5.0);

        for _ in 0..400 { viewport.zoom_at(anchor, Zoom::Out); }
        assert_eq!(viewport.scale(), 0.1);
    }

    #[test]
    fn test_zoom_at_bound_is_noop() {
        let mut viewport = Viewport::default();
        viewport.set(DVec2::new(5., 6.), 5.0);
        let before = viewport;
        assert!(!viewport.zoom_at(DVec2::new(300., 200.), Zoom::In));
        assert_eq!(viewport, before, "view should be untouched at max zoom");
    }

    #[test]
    fn test_set_clamps_scale() {
        let mut viewport = Viewport::default();
        viewport.set(DVec2::ZERO, 50.);
        assert_eq!(viewport.scale(), 5.0);
        viewport.set(DVec2::ZERO, 0.);
        assert_eq!(viewport.scale(), 0.1);
    }
}
