pub mod character;
pub mod color;
pub mod config;
pub mod error;
pub mod json;
