use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::error::Invalid;

/// A fill color written as `#rgb` or `#rrggbb`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn parse(s: &str) -> Result<Self, Invalid> {
        let s = s.trim();
        let digits = s.strip_prefix('#').ok_or_else(|| Invalid::Color(s.to_owned()))?;
        let well_formed = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
        if !well_formed { return Err(Invalid::Color(s.to_owned())); }
        Ok(Color(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> [u8; 3] {
        let digits = &self.0[1..];
        let channel = |i: usize, width: usize| {
            let v = u8::from_str_radix(&digits[i * width..(i + 1) * width], 16).unwrap_or(0);
            if width == 1 { v * 17 } else { v }
        };
        let width = digits.len() / 3;
        [channel(0, width), channel(1, width), channel(2, width)]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Color {
    type Err = Invalid;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Invalid;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_short_and_long_forms() {
        assert_eq!(Color::parse("#4ade80").map(|c| c.rgb()), Ok([0x4a, 0xde, 0x80]));
        assert_eq!(Color::parse("#fff").map(|c| c.rgb()), Ok([255, 255, 255]));
        assert_eq!(Color::parse(" #A8A29E ").map(|c| c.to_string()), Ok("#A8A29E".to_owned()));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "#", "4ade80", "#4ade8", "#4ade80ff", "#ggg", "red"] {
            assert_eq!(Color::parse(bad), Err(Invalid::Color(bad.trim().to_owned())), "`{bad}` should be rejected");
        }
    }

    #[test]
    fn test_json_rejects_bad_color() {
        assert!(serde_json::from_str::<Color>("\"#38bdf8\"").is_ok());
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }
}
