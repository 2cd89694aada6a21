//! # Layout: pointy-top hex geometry
//!
//! Converts between axial cells ([`Qr`]) and a continuous 2D plane (`DVec2`, y pointing
//! down as on a canvas). A hex's `size` is its circumradius: the distance from its center
//! to any vertex.
//!
//! ```rust
//! use axial::{Convert, Layout, Qr};
//! use glam::DVec2;
//!
//! let layout = Layout::new(30.);
//! let center: DVec2 = layout.convert(Qr::new(2, -1));
//! let back: Qr = layout.convert(center);
//! assert_eq!(back, Qr::new(2, -1));
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::qr::{self, Qr};

pub const SQRT_3: f64 = 1.732_050_807_568_877_2_f64;

/// Affine transformation matrix for pointy-top hex orientation
/// Format: (forward matrix, inverse matrix) for Qr ↔ DVec2 conversions
const ORIENTATION: ([f64; 4], [f64; 4]) = (
    [SQRT_3, SQRT_3 / 2., 0., 3. / 2.],
    [SQRT_3 / 3., -1. / 3., 0., 2. / 3.],
);

/// Trait for bidirectional coordinate conversion
pub trait Convert<T, U> {
    /// Convert from type T to type U
    fn convert(&self, it: T) -> U;
}

/// Axial coordinates before rounding to a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FracQr {
    pub q: f64,
    pub r: f64,
}

impl FracQr {
    pub fn round(self) -> Qr {
        qr::round(self.q, self.r)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Layout {
    size: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self { size: 30. }
    }
}

impl Layout {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    pub fn size(&self) -> f64 { self.size }

    /// Distance between the two vertical flat sides.
    pub fn width(&self) -> f64 { SQRT_3 * self.size }

    /// Vertex-to-vertex distance, top to bottom.
    pub fn height(&self) -> f64 { 2. * self.size }

    pub fn hex_to_pixel(&self, qr: Qr) -> DVec2 {
        let (q, r) = (qr.q as f64, qr.r as f64);
        DVec2 {
            x: (ORIENTATION.0[0] * q + ORIENTATION.0[1] * r) * self.size,
            y: (ORIENTATION.0[2] * q + ORIENTATION.0[3] * r) * self.size,
        }
    }

    /// Exact inverse of [`Layout::hex_to_pixel`], without snapping to a cell.
    pub fn pixel_to_fractional(&self, px: DVec2) -> FracQr {
        FracQr {
            q: (ORIENTATION.1[0] * px.x + ORIENTATION.1[1] * px.y) / self.size,
            r: (ORIENTATION.1[2] * px.x + ORIENTATION.1[3] * px.y) / self.size,
        }
    }

    pub fn pixel_to_hex(&self, px: DVec2) -> Qr {
        self.pixel_to_fractional(px).round()
    }

    /// Corners of the hex centered at `center`; vertex `i` sits at `60*i - 30` degrees,
    /// clockwise on screen starting from the upper-right corner.
    pub fn vertices(&self, center: DVec2) -> [DVec2; 6] {
        vertices(center, self.size)
    }
}

pub fn vertices(center: DVec2, size: f64) -> [DVec2; 6] {
    std::array::from_fn(|i| {
        let angle = (60. * i as f64 - 30.).to_radians();
        center + DVec2::new(angle.cos(), angle.sin()) * size
    })
}

impl Convert<Qr, DVec2> for Layout {
    fn convert(&self, it: Qr) -> DVec2 {
        self.hex_to_pixel(it)
    }
}

impl Convert<DVec2, Qr> for Layout {
    fn convert(&self, it: DVec2) -> Qr {
        self.pixel_to_hex(it)
    }
}
