mod layout;
mod map;
mod qr;

pub use layout::{vertices, Convert, FracQr, Layout, SQRT_3};
pub use map::Map;
pub use qr::{round, ParseQrError, Qr, DIRECTIONS};
