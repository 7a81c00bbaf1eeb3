//! Decoding and encoding around the pixelation routine: byte buffers in and
//! out, files on disk, and image inspection.

use crate::error::AppError;
use crate::pixelate::pixelate;
use crate::types::{ConversionStats, Palettes};

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage, ImageFormat, ImageOutputFormat};
use indicatif::ProgressBar;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
    pub format: Option<ImageFormat>,
    pub file_size: u64,
}

pub fn image_info(path: &Path) -> Result<ImageInfo, AppError> {
    let file_size = fs::metadata(path)?.len();
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let img = reader.decode()?;
    Ok(ImageInfo {
        width: img.width(),
        height: img.height(),
        color_type: img.color(),
        format,
        file_size,
    })
}

/// Nearest-neighbour resize so blocks stay sharp.
pub fn resize_output(img: DynamicImage, (width, height): (u32, u32)) -> Result<DynamicImage, AppError> {
    if width == 0 || height == 0 {
        return Err(AppError::InvalidSetting {
            field: "size",
            reason: format!("{}x{} has a zero dimension", width, height),
        });
    }
    if img.width() == width && img.height() == height {
        return Ok(img);
    }
    Ok(img.resize_exact(width, height, FilterType::Nearest))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    let output_format = ImageOutputFormat::from(format);
    if format == ImageFormat::Jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut Cursor::new(&mut bytes), output_format)?;
    } else {
        img.write_to(&mut Cursor::new(&mut bytes), output_format)?;
    }
    Ok(bytes)
}

/// Decodes `bytes`, pixelates them and encodes the result as `format`.
pub fn convert_bytes(
    bytes: &[u8],
    pixel_size: i64,
    palette: &str,
    palettes: &Palettes,
    format: ImageFormat,
) -> Result<(Vec<u8>, ConversionStats), AppError> {
    let img = image::load_from_memory(bytes)?;
    let result = pixelate(&img, pixel_size, palette, palettes, &ProgressBar::hidden())?;
    let encoded = encode(&result.image, format)?;
    debug!(bytes_in = bytes.len(), bytes_out = encoded.len(), ?format, "encoded");
    Ok((encoded, result.stats))
}

pub fn convert_file(
    input: &Path,
    output: &Path,
    pixel_size: i64,
    palette: &str,
    palettes: &Palettes,
    output_size: Option<(u32, u32)>,
    pb: &ProgressBar,
) -> Result<ConversionStats, AppError> {
    let img = image::open(input)?;
    let mut result = pixelate(&img, pixel_size, palette, palettes, pb)?;

    let image = match output_size {
        Some(size) => resize_output(result.image, size)?,
        None => result.image,
    };
    result.stats.output_size = (image.width(), image.height());

    let format = ImageFormat::from_path(output)?;
    fs::write(output, encode(&image, format)?)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        palette = %result.stats.palette,
        pixel_size = result.stats.pixel_size,
        width = result.stats.output_size.0,
        height = result.stats.output_size.1,
        elapsed_ms = result.stats.elapsed.as_secs_f64() * 1000.0,
        "converted"
    );
    Ok(result.stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        encode(img, ImageFormat::Png).unwrap()
    }

    #[test]
    fn converts_png_bytes() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([10, 240, 10])));
        let (bytes, stats) =
            convert_bytes(&png_bytes(&img), 8, "retro", &Palettes::builtin(), ImageFormat::Png)
                .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
        assert_eq!(stats.output_size, (100, 100));
        assert!(decoded.to_rgb8().pixels().all(|p| *p == Rgb([0, 255, 0])));
    }

    #[test]
    fn jpeg_output_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 128])));
        let (bytes, _) =
            convert_bytes(&png_bytes(&img), 4, "retro", &Palettes::builtin(), ImageFormat::Jpeg)
                .unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    #[test]
    fn png_output_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 128])));
        let (bytes, _) =
            convert_bytes(&png_bytes(&img), 4, "retro", &Palettes::builtin(), ImageFormat::Png)
                .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgba8);
        assert_eq!(*decoded.to_rgba8().get_pixel(0, 0), Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = convert_bytes(b"not an image", 4, "retro", &Palettes::builtin(), ImageFormat::Png)
            .unwrap_err();
        assert!(matches!(err, AppError::Image(_)));
    }

    #[test]
    fn validation_errors_pass_through() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let err = convert_bytes(&png_bytes(&img), 4, "sepia", &Palettes::builtin(), ImageFormat::Png)
            .unwrap_err();
        assert!(matches!(err, AppError::Pixelate(ref e) if e.is_validation()));
    }

    #[test]
    fn convert_file_writes_resized_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([200, 200, 200])))
            .save(&input)
            .unwrap();

        let stats = convert_file(
            &input,
            &output,
            5,
            "grayscale",
            &Palettes::builtin(),
            Some((40, 20)),
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(stats.original_size, (20, 10));
        assert_eq!(stats.output_size, (40, 20));

        let info = image_info(&output).unwrap();
        assert_eq!(info.width, 40);
        assert_eq!(info.height, 20);
        assert_eq!(info.format, Some(ImageFormat::Png));
        assert!(info.file_size > 0);
        let written = image::open(&output).unwrap().to_rgb8();
        assert!(written.pixels().all(|p| *p == Rgb([192, 192, 192])));
    }

    #[test]
    fn image_info_of_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = image_info(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn zero_resize_is_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        assert!(resize_output(img, (0, 4)).is_err());
    }
}
