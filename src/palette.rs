//! Suggested colour palette: the theme colour followed by fixed accents.

use crate::brief::HexColor;
use serde::{Deserialize, Serialize};

/// Accent colours appended after the theme colour.
pub const DEFAULT_ACCENTS: [HexColor; 4] = [
    HexColor::new(0x33, 0xC1, 0xFF),
    HexColor::new(0x75, 0xFF, 0x33),
    HexColor::new(0xFF, 0xC7, 0x33),
    HexColor::new(0x9D, 0x33, 0xFF),
];

/// An ordered palette; the first colour is always the theme colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPalette")]
pub struct Palette {
    colors: Vec<HexColor>,
}

#[derive(Deserialize)]
struct RawPalette {
    colors: Vec<HexColor>,
}

impl TryFrom<RawPalette> for Palette {
    type Error = &'static str;

    fn try_from(raw: RawPalette) -> Result<Self, Self::Error> {
        if raw.colors.is_empty() {
            return Err("palette must contain at least the theme colour");
        }
        Ok(Self { colors: raw.colors })
    }
}

impl Palette {
    /// Theme colour first, then each accent that differs from it.
    pub fn suggest(theme: HexColor, accents: &[HexColor]) -> Self {
        let mut colors = Vec::with_capacity(accents.len() + 1);
        colors.push(theme);
        for accent in accents {
            if !colors.contains(accent) {
                colors.push(*accent);
            }
        }
        Self { colors }
    }

    pub fn theme(&self) -> HexColor {
        self.colors[0]
    }

    pub fn colors(&self) -> &[HexColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false: a palette holds at least the theme colour.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_comes_first() {
        let theme = HexColor::new(1, 2, 3);
        let p = Palette::suggest(theme, &DEFAULT_ACCENTS);
        assert_eq!(p.theme(), theme);
        assert_eq!(p.len(), 5);
        assert_eq!(&p.colors()[1..], &DEFAULT_ACCENTS);
    }

    #[test]
    fn theme_equal_to_accent_is_not_repeated() {
        let p = Palette::suggest(DEFAULT_ACCENTS[2], &DEFAULT_ACCENTS);
        assert_eq!(p.len(), 4);
        assert_eq!(p.colors()[0], DEFAULT_ACCENTS[2]);
        assert_eq!(
            p.colors().iter().filter(|c| **c == DEFAULT_ACCENTS[2]).count(),
            1
        );
    }

    #[test]
    fn no_accents_leaves_theme_only() {
        let p = Palette::suggest(HexColor::new(0, 0, 0), &[]);
        assert_eq!(p.colors(), &[HexColor::new(0, 0, 0)]);
        assert!(!p.is_empty());
    }

    #[test]
    fn deserialising_keeps_theme_invariant() {
        let p = Palette::suggest(HexColor::new(0x6F, 0x4E, 0x37), &DEFAULT_ACCENTS);
        let json = serde_json::to_string(&p).unwrap();
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let err = serde_json::from_str::<Palette>(r#"{"colors":[]}"#).unwrap_err();
        assert!(err.to_string().contains("theme colour"), "got: {err}");
    }
}
