use std::collections::HashMap;

use image::Rgb;
use palette::Srgb;

use crate::constants::BASIC_COLORS;
use crate::error::ColorParseError;

pub fn hex_to_rgb(hex: &str) -> Result<Rgb<u8>, ColorParseError> {
    let color: Srgb<u8> = hex
        .trim()
        .parse()
        .map_err(|_| ColorParseError::Hex(hex.to_string()))?;
    Ok(Rgb([color.red, color.green, color.blue]))
}

/// Parses `r,g,b`, optionally wrapped in parentheses as colors are printed.
pub fn channels_to_rgb(text: &str) -> Result<Rgb<u8>, ColorParseError> {
    let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
    let values: Vec<&str> = inner.split(',').map(str::trim).collect();
    if values.len() != 3 {
        return Err(ColorParseError::Channel(text.to_string()));
    }

    let mut rgb = [0u8; 3];
    for (slot, value) in rgb.iter_mut().zip(values) {
        *slot = value
            .parse()
            .map_err(|_| ColorParseError::Channel(text.to_string()))?;
    }
    Ok(Rgb(rgb))
}

pub fn rgb_to_hex(color: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

pub fn format_color(color: Rgb<u8>) -> String {
    format!(
        "({}, {}, {}) {}",
        color[0],
        color[1],
        color[2],
        rgb_to_hex(color)
    )
}

pub fn rgb_to_f32(channels: &[u8]) -> [f32; 3] {
    [channels[0] as f32, channels[1] as f32, channels[2] as f32]
}

/// Mean of the three color channels.
pub fn brightness(rgb: [f32; 3]) -> f32 {
    (rgb[0] + rgb[1] + rgb[2]) / 3.0
}

pub fn color_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Colors the user can refer to by name.
#[derive(Debug, Clone)]
pub struct ColorBook {
    names: HashMap<String, Rgb<u8>>,
}

impl Default for ColorBook {
    fn default() -> Self {
        let names = BASIC_COLORS
            .iter()
            .map(|(name, rgb)| (name.to_string(), Rgb(*rgb)))
            .collect();
        ColorBook { names }
    }
}

impl ColorBook {
    /// Adds user entries given as color text, overriding built-in names.
    pub fn extend_from_text(
        &mut self,
        entries: &HashMap<String, String>,
    ) -> Result<(), ColorParseError> {
        for (name, text) in entries {
            let color = self.parse(text)?;
            self.names.insert(name.to_lowercase(), color);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Rgb<u8>> {
        self.names.get(&name.trim().to_lowercase()).copied()
    }

    pub fn parse(&self, text: &str) -> Result<Rgb<u8>, ColorParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if text.contains(',') {
            return channels_to_rgb(text);
        }
        if let Some(color) = self.get(text) {
            return Ok(color);
        }
        if looks_like_hex(text) {
            return hex_to_rgb(text);
        }
        Err(ColorParseError::UnknownName(text.to_string()))
    }
}

fn looks_like_hex(text: &str) -> bool {
    let digits = text.trim_start_matches('#');
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(hex_to_rgb("#ff8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(hex_to_rgb("ff8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(hex_to_rgb("#fff").unwrap(), Rgb([255, 255, 255]));
        assert!(hex_to_rgb("#zzzzzz").is_err());
    }

    #[test]
    fn parses_channel_triples() {
        assert_eq!(channels_to_rgb("10,20,30").unwrap(), Rgb([10, 20, 30]));
        assert_eq!(channels_to_rgb("(10, 20, 30)").unwrap(), Rgb([10, 20, 30]));
        assert!(channels_to_rgb("10,20").is_err());
        assert!(channels_to_rgb("10,20,256").is_err());
    }

    #[test]
    fn color_book_resolves_names_before_hex() {
        let mut book = ColorBook::default();
        assert_eq!(book.parse("Red").unwrap(), Rgb([255, 0, 0]));

        let mut entries = HashMap::new();
        entries.insert("add".to_string(), "1,2,3".to_string());
        book.extend_from_text(&entries).unwrap();
        // "add" is also valid hex; the name wins
        assert_eq!(book.parse("add").unwrap(), Rgb([1, 2, 3]));
        assert_eq!(book.parse("#add").unwrap(), Rgb([0xaa, 0xdd, 0xdd]));

        assert_eq!(
            book.parse("mauve"),
            Err(ColorParseError::UnknownName("mauve".to_string()))
        );
        assert_eq!(book.parse("  "), Err(ColorParseError::Empty));
    }

    #[test]
    fn brightness_and_distance() {
        assert_eq!(brightness([10.0, 20.0, 30.0]), 20.0);
        assert_eq!(color_distance([0.0, 0.0, 0.0], [3.0, 4.0, 0.0]), 5.0);
        assert_eq!(format_color(Rgb([10, 10, 10])), "(10, 10, 10) #0a0a0a");
    }
}
