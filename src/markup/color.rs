//! RGB text colors and the classic named palette.

use std::fmt;

/// An RGB text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Named colors, in legacy code order.
const NAMED_COLORS: [(&str, Color); 16] = [
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("dark_blue", Color::rgb(0x00, 0x00, 0xAA)),
    ("dark_green", Color::rgb(0x00, 0xAA, 0x00)),
    ("dark_aqua", Color::rgb(0x00, 0xAA, 0xAA)),
    ("dark_red", Color::rgb(0xAA, 0x00, 0x00)),
    ("dark_purple", Color::rgb(0xAA, 0x00, 0xAA)),
    ("gold", Color::rgb(0xFF, 0xAA, 0x00)),
    ("gray", Color::rgb(0xAA, 0xAA, 0xAA)),
    ("dark_gray", Color::rgb(0x55, 0x55, 0x55)),
    ("blue", Color::rgb(0x55, 0x55, 0xFF)),
    ("green", Color::rgb(0x55, 0xFF, 0x55)),
    ("aqua", Color::rgb(0x55, 0xFF, 0xFF)),
    ("red", Color::rgb(0xFF, 0x55, 0x55)),
    ("light_purple", Color::rgb(0xFF, 0x55, 0xFF)),
    ("yellow", Color::rgb(0xFF, 0xFF, 0x55)),
    ("white", Color::rgb(0xFF, 0xFF, 0xFF)),
];

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up a named color. Accepts the `grey` spellings too.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let name = match name.as_str() {
            "grey" => "gray",
            "dark_grey" => "dark_gray",
            other => other,
        };
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, color)| *color)
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        Some(Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }

    /// Parse either a color name or a hex code.
    pub fn parse(value: &str) -> Option<Self> {
        if value.starts_with('#') {
            Self::from_hex(value)
        } else {
            Self::from_name(value)
        }
    }

    /// Name of this color if it is one of the named palette entries.
    pub fn name(&self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, color)| color == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::from_name("red"), Some(Color::rgb(0xFF, 0x55, 0x55)));
        assert_eq!(Color::from_name("GREY"), Color::from_name("gray"));
        assert_eq!(Color::from_name("not_a_color"), None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::from_hex("#00fb9a"), Some(Color::rgb(0x00, 0xFB, 0x9A)));
        assert_eq!(Color::from_hex("00fb9a"), None);
        assert_eq!(Color::from_hex("#00fb9"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::rgb(0xAA, 0x00, 0x00).to_string(), "dark_red");
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_string(), "#123456");
    }
}
