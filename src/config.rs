use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_PALETTE, DEFAULT_PIXEL_SIZE, OUTPUT_SUFFIX, VERSION,
};
use crate::error::AppError;
use crate::types::{AppConfig, LogFormat, Palette, Palettes};
use crate::utils::hex_to_rgb;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches, Command};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde_derive::Deserialize;

#[derive(Debug, Deserialize)]
struct SerializedAppConfig {
    pixel_size: String,
    palette: String,
    log_level: String,
    log_format: String,
    custom_palettes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SerializedPalette {
    colors: Vec<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(""))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

fn load_config(
    config_path: Option<&Path>,
    config_dir: &Path,
) -> Result<SerializedAppConfig, config::ConfigError> {
    let mut builder = ConfigBuilder::<DefaultState>::default()
        .set_default("pixel_size", DEFAULT_PIXEL_SIZE)?
        .set_default("palette", DEFAULT_PALETTE)?
        .set_default("log_level", "info")?
        .set_default("log_format", "text")?
        .set_default("custom_palettes", Vec::<String>::new())?;

    let default_config_path = config_dir.join("config.toml");
    if default_config_path.exists() {
        builder = builder.add_source(File::from(default_config_path).required(false));
    }

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("PIXEL_ARTIST"));

    builder.build()?.try_deserialize()
}

/// Reads `<dir>/<name>.toml`, which holds `colors = ["#rrggbb", ...]`.
pub fn load_palette(name: &str, dir: &Path) -> Result<Palette, AppError> {
    let path = dir.join(format!("{}.toml", name));
    if !path.exists() {
        return Err(AppError::Palette {
            name: name.to_string(),
            reason: format!("{} not found", path.display()),
        });
    }
    let serialized: SerializedPalette = toml::from_str(&fs::read_to_string(&path)?)?;
    let colors = serialized
        .colors
        .iter()
        .map(|hex| hex_to_rgb(hex))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Palette {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(Palette::new(name, colors))
}

/// Parses `WxH` (or `W,H`) into a non-zero size.
pub fn parse_size(size: &str) -> Result<(u32, u32), AppError> {
    let invalid = |reason: &str| AppError::InvalidSetting {
        field: "size",
        reason: format!("'{}': {}", size, reason),
    };
    let (w, h) = size
        .split_once(|c| matches!(c, 'x' | 'X' | ','))
        .ok_or_else(|| invalid("expected WIDTHxHEIGHT"))?;
    let w: u32 = w.trim().parse().map_err(|_| invalid("invalid width"))?;
    let h: u32 = h.trim().parse().map_err(|_| invalid("invalid height"))?;
    match (w, h) {
        (0, _) => Err(invalid("width is zero")),
        (_, 0) => Err(invalid("height is zero")),
        _ => Ok((w, h)),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "text" | "pretty" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(AppError::InvalidSetting {
            field: "log_format",
            reason: format!("'{}' is not one of text, json", other),
        }),
    }
}

/// `photo.jpg` becomes `photo_pixel.jpg`, next to the input unless
/// `output_dir` is given.
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    let file_name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension);
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

fn command() -> Command<'static> {
    Command::new("Pixel Artist")
        .version(VERSION)
        .author("Taylor Beeston")
        .about("Turns images into pixel art")
        .after_help("Each image is split into square blocks of --pixel-size pixels. Every block is replaced by its average color, which is then snapped to the nearest color of --palette (use 'original' to keep the averaged colors).\n\nCustom palettes are listed under 'custom_palettes' in the config file. Each name must have a matching '<name>.toml' next to the config file containing colors = [\"#rrggbb\", ...].")
        .arg(
            Arg::new("Pixel Size")
                .short('p')
                .long("pixel-size")
                .value_name("SIZE")
                .help("[1-64] Overrides the pixel size set in config")
                .takes_value(true)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("Palette")
                .long("palette")
                .value_name("NAME")
                .help("Overrides the palette set in config")
                .takes_value(true),
        )
        .arg(
            Arg::new("Output")
                .short('o')
                .long("output")
                .value_name("/path/to/output.png")
                .help("Output file (single input only)")
                .takes_value(true)
                .conflicts_with("Output Dir"),
        )
        .arg(
            Arg::new("Output Dir")
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for converted images")
                .takes_value(true),
        )
        .arg(
            Arg::new("Size")
                .long("size")
                .value_name("WxH")
                .help("Resize the result (nearest neighbour) to WxH")
                .takes_value(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("/path/to/config.toml")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .arg(
            Arg::new("Log Format")
                .long("log-format")
                .value_name("FORMAT")
                .help("[text|json] Overrides the log format set in config")
                .takes_value(true),
        )
        .arg(
            Arg::new("List Palettes")
                .long("list-palettes")
                .help("Print the available palettes and exit"),
        )
        .arg(
            Arg::new("Info")
                .long("info")
                .help("Print information about each image instead of converting it"),
        )
        .arg(
            Arg::new("Image Path")
                .help("Paths to the images you'd like to pixelate")
                .multiple_values(true)
                .required_unless_present("List Palettes")
                .index(1),
        )
}

fn input_output_pairs(matches: &ArgMatches) -> Result<Vec<(PathBuf, PathBuf)>, AppError> {
    let inputs: Vec<PathBuf> = matches
        .values_of("Image Path")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();

    if let Some(output) = matches.value_of("Output") {
        if inputs.len() != 1 {
            return Err(AppError::InvalidSetting {
                field: "output",
                reason: format!("--output needs exactly one input, got {}", inputs.len()),
            });
        }
        return Ok(inputs
            .into_iter()
            .map(|input| (input, PathBuf::from(output)))
            .collect());
    }

    let output_dir = matches.value_of("Output Dir").map(Path::new);
    Ok(inputs
        .into_iter()
        .map(|input| {
            let output = default_output_path(&input, output_dir);
            (input, output)
        })
        .collect())
}

pub fn init() -> Result<AppConfig, AppError> {
    init_from(std::env::args_os(), &default_config_dir())
}

pub fn init_from<I, T>(args: I, default_dir: &Path) -> Result<AppConfig, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;

    let config_path = matches.value_of("config").map(Path::new);
    let config = load_config(config_path, default_dir)?;

    // Palette files sit next to whichever config file was chosen.
    let palette_dir = config_path
        .and_then(Path::parent)
        .unwrap_or(default_dir);
    let custom = config
        .custom_palettes
        .iter()
        .map(|name| load_palette(name, palette_dir))
        .collect::<Result<Vec<_>, _>>()?;
    let palettes = Palettes::with_custom(custom)?;

    let pixel_size = matches
        .value_of("Pixel Size")
        .unwrap_or(&config.pixel_size);

    let pixel_size: i64 = pixel_size
        .trim()
        .parse()
        .map_err(|e| AppError::InvalidSetting {
            field: "pixel_size",
            reason: format!("Failed to parse pixel_size: {}", e),
        })?;

    let palette = matches
        .value_of("Palette")
        .unwrap_or(&config.palette)
        .to_string();

    let log_format = parse_log_format(matches.value_of("Log Format").unwrap_or(&config.log_format))?;

    let output_size = matches.value_of("Size").map(parse_size).transpose()?;

    Ok(AppConfig {
        input_output_pairs: input_output_pairs(&matches)?,
        pixel_size,
        palette,
        palettes,
        output_size,
        log_level: config.log_level,
        log_format,
        list_palettes: matches.is_present("List Palettes"),
        info: matches.is_present("Info"),
    })
}
