use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Unit steps to the six neighbours, counter-clockwise from east.
pub const DIRECTIONS: [Qr; 6] = [
    Qr { q: 1, r: 0 },  // east
    Qr { q: 1, r: -1 }, // north-east
    Qr { q: 0, r: -1 }, // north-west
    Qr { q: -1, r: 0 }, // west
    Qr { q: -1, r: 1 }, // south-west
    Qr { q: 0, r: 1 },  // south-east
];

/// Axial coordinate of a cell on a pointy-top hex grid.
///
/// The third cube coordinate is implied: `s = -q - r`. Coordinates order row-major
/// (by `r`, then `q`), the same order the renderer walks a visible range in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct Qr {
    pub q: i32,
    pub r: i32,
}

impl Qr {
    pub const ORIGIN: Qr = Qr { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn distance(&self, other: &Qr) -> i32 {
        let d = *self - *other;
        d.q.abs().max(d.r.abs()).max(d.s().abs())
    }

    pub fn neighbors(&self) -> [Qr; 6] {
        DIRECTIONS.map(|dir| *self + dir)
    }
}

impl Ord for Qr {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl PartialOrd for Qr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Mul<i32> for Qr {
    type Output = Qr;
    fn mul(self, rhs: i32) -> Self::Output {
        Qr { q: self.q * rhs, r: self.r * rhs }
    }
}

impl Add<Qr> for Qr {
    type Output = Qr;
    fn add(self, rhs: Qr) -> Self::Output {
        Qr { q: self.q + rhs.q, r: self.r + rhs.r }
    }
}

impl Sub<Qr> for Qr {
    type Output = Qr;
    fn sub(self, rhs: Qr) -> Self::Output {
        Qr { q: self.q - rhs.q, r: self.r - rhs.r }
    }
}

impl From<(i32, i32)> for Qr {
    fn from((q, r): (i32, i32)) -> Self {
        Qr { q, r }
    }
}

impl From<Qr> for (i32, i32) {
    fn from(qr: Qr) -> (i32, i32) {
        (qr.q, qr.r)
    }
}

/// Cell keys in map files are written `"q,r"`.
impl fmt::Display for Qr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseQrError {
    pub input: String,
}

impl fmt::Display for ParseQrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a \"q,r\" cell key", self.input)
    }
}

impl std::error::Error for ParseQrError {}

impl FromStr for Qr {
    type Err = ParseQrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseQrError { input: s.to_owned() };
        let (q, r) = s.split_once(',').ok_or_else(err)?;
        let q = q.trim().parse().map_err(|_| err())?;
        let r = r.trim().parse().map_err(|_| err())?;
        Ok(Qr { q, r })
    }
}

/// Snap fractional axial coordinates to the nearest cell with cube rounding.
///
/// All three cube components are rounded independently (half to even); the one with the
/// largest rounding error is then rebuilt from the other two so that `q + r + s == 0`.
/// Ties resolve q first, then r, then s.
pub fn round(q0: f64, r0: f64) -> Qr {
    let s0 = -q0 - r0;
    let mut q = q0.round_ties_even();
    let mut r = r0.round_ties_even();
    let s = s0.round_ties_even();

    let q_diff = (q - q0).abs();
    let r_diff = (r - r0).abs();
    let s_diff = (s - s0).abs();

    if q_diff > r_diff && q_diff > s_diff {
        q = -r - s;
    } else if r_diff > s_diff {
        r = -q - s;
    }

    Qr { q: q as i32, r: r as i32 }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== ARITHMETIC =====

    #[test]
    fn test_s_is_derived() {
        let qr = Qr::new(3, -5);
        assert_eq!(qr.s(), 2);
        assert_eq!(qr.q + qr.r + qr.s(), 0);
    }

    #[test]
    fn test_neighbors_are_at_distance_one() {
        let center = Qr::new(2, -1);
        for n in center.neighbors() {
            assert_eq!(center.distance(&n), 1, "{n:?} should be adjacent to {center:?}");
        }
    }

    #[test]
    fn test_distance_along_axes() {
        assert_eq!(Qr::ORIGIN.distance(&Qr::new(4, 0)), 4);
        assert_eq!(Qr::ORIGIN.distance(&Qr::new(0, -3)), 3);
        assert_eq!(Qr::ORIGIN.distance(&Qr::new(2, -5)), 5);
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut cells = vec![Qr::new(5, 0), Qr::new(-1, 1), Qr::new(0, 0), Qr::new(0, -1)];
        cells.sort();
        assert_eq!(cells, vec![Qr::new(0, -1), Qr::new(0, 0), Qr::new(5, 0), Qr::new(-1, 1)]);
    }

    // ===== KEY ENCODING =====

    #[test]
    fn test_display_key() {
        assert_eq!(Qr::new(-3, 12).to_string(), "-3,12");
    }

    #[test]
    fn test_parse_key() {
        assert_eq!("1,0".parse::<Qr>(), Ok(Qr::new(1, 0)));
        assert_eq!(" -4 , 7 ".parse::<Qr>(), Ok(Qr::new(-4, 7)));
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["", "1", "1;2", "a,b", "1,2,3", "1.5,2"] {
            assert!(bad.parse::<Qr>().is_err(), "`{bad}` should not parse");
        }
    }

    // ===== ROUNDING =====

    #[test]
    fn test_round_exact_cells() {
        assert_eq!(round(0., 0.), Qr::ORIGIN);
        assert_eq!(round(3., -2.), Qr::new(3, -2));
    }

    #[test]
    fn test_round_nearby_fractions() {
        assert_eq!(round(0.1, 0.1), Qr::ORIGIN);
        assert_eq!(round(0.9, -0.1), Qr::new(1, 0));
        assert_eq!(round(-1.2, 0.9), Qr::new(-1, 1));
    }

    #[test]
    fn test_round_rebuilds_component_with_largest_error() {
        // q=0.2 r=0.2 s=-0.4: s has the largest error and is rebuilt
        assert_eq!(round(0.2, 0.2), Qr::ORIGIN);
        // q=0.6 r=0.3 s=-0.9: q has the largest error and is rebuilt from r and s
        assert_eq!(round(0.6, 0.3), Qr::new(1, 0));
        // q=0.4 r=0.4 s=-0.8: q and r tie, r beats s and is rebuilt
        assert_eq!(round(0.4, 0.4), Qr::new(0, 1));
    }

    #[test]
    fn test_round_preserves_cube_constraint() {
        let mut f = -3.0;
        while f < 3.0 {
            let qr = round(f, 0.37 - f * 0.5);
            assert_eq!(qr.q + qr.r + qr.s(), 0);
            f += 0.13;
        }
    }
}
