//! Hex map and character editing for tactical maps.
//!
//! `mapforge` paints terrain onto a sparse axial grid and lays out frames for a host to draw;
//! `charforge` maintains the character roster the map editor can overlay.

pub mod charforge;
pub mod common;
pub mod mapforge;

pub use common::{
    config::Settings,
    error::{Error, Invalid, Result},
};
