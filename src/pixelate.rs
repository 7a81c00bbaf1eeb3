use crate::error::PixelateError;
use crate::types::{ConversionResult, ConversionStats, PaletteChoice, Palettes, PixelSize};
use crate::utils::{find_closest_color, ChannelSums};

use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage};
use indicatif::ProgressBar;
use tracing::{debug, instrument};

/// Pixelates `img` against the built-in palettes.
pub fn convert(
    img: &DynamicImage,
    pixel_size: i64,
    palette: &str,
) -> Result<ConversionResult, PixelateError> {
    pixelate(img, pixel_size, palette, &Palettes::builtin(), &ProgressBar::hidden())
}

/// Splits `img` into `pixel_size` squares, replaces each square with its
/// average color, and snaps that color to `palette` unless it is `original`.
///
/// Edge blocks are truncated to the image bounds and averaged over the pixels
/// they actually cover, so the output always has the input's dimensions.
/// Arguments are validated before any pixel is read. `pb` advances by one per
/// block row.
#[instrument(skip(img, palettes, pb), fields(width = img.width(), height = img.height()))]
pub fn pixelate(
    img: &DynamicImage,
    pixel_size: i64,
    palette: &str,
    palettes: &Palettes,
    pb: &ProgressBar,
) -> Result<ConversionResult, PixelateError> {
    let started = Instant::now();
    let size = PixelSize::new(pixel_size)?;
    let choice = palettes.get(palette)?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(PixelateError::Processing(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }
    if let PaletteChoice::Quantize(p) = choice {
        if p.colors.is_empty() {
            return Err(PixelateError::Processing(format!(
                "palette '{}' has no colors",
                p.name
            )));
        }
    }

    let has_alpha = img.color().has_alpha();
    let source = img.to_rgba8();
    let step = size.get();
    let block_rows = height.div_ceil(step);
    let block_cols = width.div_ceil(step);
    debug!(step, block_rows, block_cols, has_alpha, "pixelating");

    pb.set_length(u64::from(block_rows));
    let mut output: RgbaImage = ImageBuffer::new(width, height);

    for by in 0..block_rows {
        let y0 = by * step;
        let y1 = (y0 + step).min(height);
        for bx in 0..block_cols {
            let x0 = bx * step;
            let x1 = (x0 + step).min(width);

            let mut sums = ChannelSums::default();
            for y in y0..y1 {
                for x in x0..x1 {
                    sums.add(source.get_pixel(x, y));
                }
            }
            let average = sums.average().ok_or_else(|| {
                PixelateError::Processing(format!("empty block at ({}, {})", x0, y0))
            })?;
            let color = map_color(average, choice)?;

            for y in y0..y1 {
                for x in x0..x1 {
                    output.put_pixel(x, y, color);
                }
            }
        }
        pb.inc(1);
    }

    let image = if has_alpha {
        DynamicImage::ImageRgba8(output)
    } else {
        DynamicImage::ImageRgba8(output).into_rgb8().into()
    };

    let stats = ConversionStats {
        elapsed: started.elapsed(),
        original_size: (width, height),
        output_size: image.dimensions(),
        palette: choice.name().to_string(),
        pixel_size: step,
        blocks: u64::from(block_rows) * u64::from(block_cols),
    };
    debug!(elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0, "pixelated");

    Ok(ConversionResult { image, stats })
}

fn map_color(average: Rgba<u8>, choice: PaletteChoice<'_>) -> Result<Rgba<u8>, PixelateError> {
    match choice {
        PaletteChoice::Original => Ok(average),
        PaletteChoice::Quantize(palette) => {
            let [r, g, b, a] = average.0;
            let nearest = find_closest_color([r, g, b], &palette.colors).ok_or_else(|| {
                PixelateError::Processing(format!("palette '{}' has no colors", palette.name))
            })?;
            Ok(Rgba([nearest.red, nearest.green, nearest.blue, a]))
        }
    }
}
