use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};

/// Opaque sRGB colour, serialised as a `#rrggbb` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// `#ffffff`, the "no tint" colour.
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    /// `#000000`.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// `#333333`, drawn in place of pure black tints.
    pub const DARK_GRAY: Self = Self::new(0x33, 0x33, 0x33);

    /// Build a colour from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional, case-insensitive).
    pub fn parse_hex(s: &str) -> StudioResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> StudioResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| StudioError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(StudioError::validation("hex colour must be ASCII"));
        }
        match s.len() {
            3 => {
                let r = hex_byte(&s[0..1])?;
                let g = hex_byte(&s[1..2])?;
                let b = hex_byte(&s[2..3])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            6 => Ok(Self::new(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            _ => Err(StudioError::validation(
                "hex colour must be #RGB or #RRGGBB (case-insensitive)",
            )),
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Colour actually used when drawing a garment tint.
    ///
    /// Pure black becomes [`Rgb8::DARK_GRAY`] so layers stay visible on the garment.
    pub fn render_tint(self) -> Self {
        if self == Self::BLACK {
            Self::DARK_GRAY
        } else {
            self
        }
    }

    /// `true` for `#ffffff`.
    pub fn is_white(self) -> bool {
        self == Self::WHITE
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb8 {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
