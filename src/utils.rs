use crate::error::AppError;

use image::Rgba;
use palette::Srgb;

/// Parses `#rrggbb`, `rrggbb` or the `#rgb` shorthand.
pub fn hex_to_rgb(hex: &str) -> Result<Srgb<u8>, AppError> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = |reason: &str| AppError::InvalidSetting {
        field: "color",
        reason: format!("'{}': {}", hex, reason),
    };

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid("expected 3 or 6 hex digits")),
    };
    if !expanded.is_ascii() {
        return Err(invalid("not a hex color"));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&expanded[range], 16).map_err(|e| invalid(&e.to_string()))
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn distance_squared(a: [u8; 3], b: Srgb<u8>) -> u32 {
    let dr = i32::from(a[0]) - i32::from(b.red);
    let dg = i32::from(a[1]) - i32::from(b.green);
    let db = i32::from(a[2]) - i32::from(b.blue);
    (dr * dr + dg * dg + db * db) as u32
}

/// Nearest palette entry by Euclidean RGB distance. Ties go to the entry
/// that comes first.
pub fn find_closest_color(color: [u8; 3], colors: &[Srgb<u8>]) -> Option<Srgb<u8>> {
    colors
        .iter()
        .copied()
        .min_by_key(|&candidate| distance_squared(color, candidate))
}

/// Running per-channel sums for one block.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChannelSums {
    sums: [u64; 4],
    count: u64,
}

impl ChannelSums {
    pub fn add(&mut self, pixel: &Rgba<u8>) {
        for (sum, &channel) in self.sums.iter_mut().zip(pixel.0.iter()) {
            *sum += u64::from(channel);
        }
        self.count += 1;
    }

    /// Mean of every channel, rounded half up. `None` for an empty block.
    pub fn average(&self) -> Option<Rgba<u8>> {
        if self.count == 0 {
            return None;
        }
        let mean = |sum: u64| ((sum + self.count / 2) / self.count) as u8;
        Some(Rgba([
            mean(self.sums[0]),
            mean(self.sums[1]),
            mean(self.sums[2]),
            mean(self.sums[3]),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(hex_to_rgb("#0f380f").unwrap(), Srgb::new(15, 56, 15));
        assert_eq!(hex_to_rgb("9BBC0F").unwrap(), Srgb::new(155, 188, 15));
        assert_eq!(hex_to_rgb("#fa0").unwrap(), Srgb::new(255, 170, 0));
    }

    #[test]
    fn rejects_bad_hex() {
        for bad in ["", "#12", "#1234567", "#gg0000", "#ééé"] {
            assert!(hex_to_rgb(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn closest_color_prefers_first_on_tie() {
        let colors = [Srgb::new(0, 0, 0), Srgb::new(20, 20, 20), Srgb::new(0, 0, 0)];
        assert_eq!(find_closest_color([10, 10, 10], &colors), Some(Srgb::new(0, 0, 0)));

        let colors = [Srgb::new(100, 0, 0), Srgb::new(0, 0, 100)];
        // Both are at distance 100^2 from black.
        assert_eq!(find_closest_color([0, 0, 0], &colors), Some(Srgb::new(100, 0, 0)));
    }

    #[test]
    fn closest_color_of_empty_palette_is_none() {
        assert_eq!(find_closest_color([1, 2, 3], &[]), None);
    }

    #[test]
    fn averages_round_half_up() {
        let mut sums = ChannelSums::default();
        sums.add(&Rgba([0, 10, 255, 255]));
        sums.add(&Rgba([1, 20, 254, 0]));
        assert_eq!(sums.average(), Some(Rgba([1, 15, 255, 128])));
        assert_eq!(ChannelSums::default().average(), None);
    }
}
