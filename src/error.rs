use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Processing,
}

/// Errors raised by the pixelation routine itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PixelateError {
    #[error("pixel size must be between 1 and 64, got {0}")]
    InvalidPixelSize(i64),
    #[error("unknown palette '{name}' (available: {})", .available.join(", "))]
    UnknownPalette { name: String, available: Vec<String> },
    #[error("processing failed: {0}")]
    Processing(String),
}

impl PixelateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PixelateError::InvalidPixelSize(_) | PixelateError::UnknownPalette { .. } => {
                ErrorKind::Validation
            }
            PixelateError::Processing(_) => ErrorKind::Processing,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Pixelate(#[from] PixelateError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to parse palette file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("invalid palette '{name}': {reason}")]
    Palette { name: String, reason: String },
    #[error("failed to set up logging: {0}")]
    Logging(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert_eq!(PixelateError::InvalidPixelSize(0).kind(), ErrorKind::Validation);
        let unknown = PixelateError::UnknownPalette {
            name: "neon".to_string(),
            available: vec!["retro".to_string(), "original".to_string()],
        };
        assert!(unknown.is_validation());
        assert_eq!(
            unknown.to_string(),
            "unknown palette 'neon' (available: retro, original)"
        );
        assert_eq!(
            PixelateError::Processing("bad".into()).kind(),
            ErrorKind::Processing
        );
    }

    #[test]
    fn pixel_size_message_names_the_range() {
        assert_eq!(
            PixelateError::InvalidPixelSize(65).to_string(),
            "pixel size must be between 1 and 64, got 65"
        );
    }
}
