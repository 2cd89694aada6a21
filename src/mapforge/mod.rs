pub mod editor;
pub mod images;
pub mod render;
pub mod route;
pub mod store;
pub mod terrain;
pub mod viewport;

pub use editor::{Change, Editor};
