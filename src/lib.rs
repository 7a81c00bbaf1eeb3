pub mod codec;
pub mod colors;
pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod pixelate;
pub mod types;
pub mod utils;

pub use crate::error::{AppError, ErrorKind, PixelateError};
pub use crate::pixelate::{convert, pixelate};
pub use crate::types::{ConversionResult, ConversionStats, Palette, Palettes};
