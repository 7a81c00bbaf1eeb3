pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MIN_PIXEL_SIZE: i64 = 1;
pub const MAX_PIXEL_SIZE: i64 = 64;

/// Pseudo-palette name: pixelate only, keep the averaged colors.
pub const ORIGINAL_PALETTE: &str = "original";

pub const DEFAULT_PIXEL_SIZE: &str = "8";
pub const DEFAULT_PALETTE: &str = "retro";

pub const CONFIG_DIR_NAME: &str = "pixel-artist";
pub const OUTPUT_SUFFIX: &str = "_pixel";
