use crate::colors::BUILTIN;
use crate::constants::{MAX_PIXEL_SIZE, MIN_PIXEL_SIZE, ORIGINAL_PALETTE};
use crate::error::{AppError, PixelateError};

use std::path::PathBuf;
use std::time::Duration;

use image::DynamicImage;
use palette::Srgb;

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<Srgb<u8>>,
}

impl Palette {
    pub fn new(name: impl Into<String>, colors: Vec<Srgb<u8>>) -> Self {
        Palette {
            name: name.into(),
            colors,
        }
    }

    pub fn from_rgb(name: &str, colors: &[[u8; 3]]) -> Self {
        Palette::new(
            name,
            colors.iter().map(|&[r, g, b]| Srgb::new(r, g, b)).collect(),
        )
    }

    pub fn contains(&self, color: Srgb<u8>) -> bool {
        self.colors.contains(&color)
    }
}

/// What a palette name resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaletteChoice<'a> {
    /// Keep the averaged block colors.
    Original,
    Quantize(&'a Palette),
}

impl PaletteChoice<'_> {
    pub fn name(&self) -> &str {
        match self {
            PaletteChoice::Original => ORIGINAL_PALETTE,
            PaletteChoice::Quantize(palette) => &palette.name,
        }
    }
}

/// Registry of the palettes known to the process. Built once at startup and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Palettes(Vec<Palette>);

impl Palettes {
    pub fn builtin() -> Self {
        Palettes(
            BUILTIN
                .iter()
                .map(|(name, colors)| Palette::from_rgb(name, colors))
                .collect(),
        )
    }

    /// Built-in palettes followed by `custom`, rejecting empty palettes and
    /// names that are already taken.
    pub fn with_custom(custom: Vec<Palette>) -> Result<Self, AppError> {
        let mut palettes = Palettes::builtin();
        for palette in custom {
            if palette.colors.is_empty() {
                return Err(AppError::Palette {
                    name: palette.name,
                    reason: "palette has no colors".to_string(),
                });
            }
            if palette.name == ORIGINAL_PALETTE || palettes.find(&palette.name).is_some() {
                return Err(AppError::Palette {
                    name: palette.name,
                    reason: "name is already in use".to_string(),
                });
            }
            palettes.0.push(palette);
        }
        Ok(palettes)
    }

    fn find(&self, name: &str) -> Option<&Palette> {
        self.0.iter().find(|palette| palette.name == name)
    }

    pub fn get(&self, name: &str) -> Result<PaletteChoice<'_>, PixelateError> {
        if name == ORIGINAL_PALETTE {
            return Ok(PaletteChoice::Original);
        }
        self.find(name)
            .map(PaletteChoice::Quantize)
            .ok_or_else(|| PixelateError::UnknownPalette {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Every selectable name, `original` last.
    pub fn names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|palette| palette.name.clone())
            .chain(std::iter::once(ORIGINAL_PALETTE.to_string()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.0.iter()
    }
}

impl Default for Palettes {
    fn default() -> Self {
        Palettes::builtin()
    }
}

/// Side length of a square block, guaranteed to be in `1..=64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize(u32);

impl PixelSize {
    pub fn new(value: i64) -> Result<Self, PixelateError> {
        if (MIN_PIXEL_SIZE..=MAX_PIXEL_SIZE).contains(&value) {
            Ok(PixelSize(value as u32))
        } else {
            Err(PixelateError::InvalidPixelSize(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionStats {
    pub elapsed: Duration,
    pub original_size: (u32, u32),
    pub output_size: (u32, u32),
    pub palette: String,
    pub pixel_size: u32,
    pub blocks: u64,
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub image: DynamicImage,
    pub stats: ConversionStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug)]
pub struct AppConfig {
    pub input_output_pairs: Vec<(PathBuf, PathBuf)>,
    pub pixel_size: i64,
    pub palette: String,
    pub palettes: Palettes,
    pub output_size: Option<(u32, u32)>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub list_palettes: bool,
    pub info: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_palettes_have_expected_sizes() {
        let palettes = Palettes::builtin();
        let sizes: Vec<(String, usize)> = palettes
            .iter()
            .map(|p| (p.name.clone(), p.colors.len()))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("gameboy".to_string(), 4),
                ("nes".to_string(), 24),
                ("grayscale".to_string(), 8),
                ("retro".to_string(), 16),
            ]
        );
    }

    #[test]
    fn names_end_with_original() {
        let names = Palettes::builtin().names();
        assert_eq!(names.last().map(String::as_str), Some("original"));
        assert!(names.contains(&"gameboy".to_string()));
    }

    #[test]
    fn original_resolves_without_a_palette() {
        let palettes = Palettes::builtin();
        assert_eq!(palettes.get("original"), Ok(PaletteChoice::Original));
        assert_eq!(palettes.get("nes").map(|c| c.name().to_string()), Ok("nes".to_string()));
    }

    #[test]
    fn unknown_palette_is_a_validation_error() {
        let err = Palettes::builtin().get("sepia").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn custom_palettes_are_appended() {
        let sunset = Palette::from_rgb("sunset", &[[255, 94, 77], [255, 195, 113]]);
        let palettes = Palettes::with_custom(vec![sunset.clone()]).unwrap();
        assert_eq!(palettes.get("sunset"), Ok(PaletteChoice::Quantize(&sunset)));
        assert_eq!(palettes.names().len(), 6);
    }

    #[test]
    fn custom_palettes_cannot_shadow_or_be_empty() {
        let shadow = Palette::from_rgb("retro", &[[1, 2, 3]]);
        assert!(matches!(
            Palettes::with_custom(vec![shadow]),
            Err(AppError::Palette { .. })
        ));
        let original = Palette::from_rgb("original", &[[1, 2, 3]]);
        assert!(Palettes::with_custom(vec![original]).is_err());
        let empty = Palette::new("void", Vec::new());
        assert!(Palettes::with_custom(vec![empty]).is_err());
    }

    #[test]
    fn pixel_size_bounds() {
        assert_eq!(PixelSize::new(1).map(PixelSize::get), Ok(1));
        assert_eq!(PixelSize::new(64).map(PixelSize::get), Ok(64));
        for bad in [0, -1, -64, 65, 1000] {
            assert_eq!(PixelSize::new(bad), Err(PixelateError::InvalidPixelSize(bad)));
        }
    }
}
