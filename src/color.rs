//! Hex Colors
//!
//! The renderer reads colors as `"0xRRGGBB"` strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const GRAY: Rgb = Rgb::new(128, 128, 128);
pub const WHITE: Rgb = Rgb::new(255, 255, 255);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        hex_color(self)
    }
}

/// Uppercase `0xRRGGBB` representation
pub fn hex_color(color: Rgb) -> String {
    format!("0x{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parse `0xRRGGBB` or `#RRGGBB` (case-insensitive)
pub fn parse_hex(s: &str) -> Option<Rgb> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('#'))?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}
