//! The brief: the four user inputs every brand kit is generated from.
//!
//! A [`BrandBrief`] can only be built through [`BrandBrief::new`], which
//! trims and validates each field. Downstream stages therefore never need to
//! re-check for blank names or malformed colours.

use crate::error::BrandKitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted brand name or industry, in characters.
pub const MAX_FIELD_CHARS: usize = 120;

/// Theme colour used when the user does not pick one.
pub const DEFAULT_THEME_COLOR: HexColor = HexColor::new(0xFF, 0x57, 0x33);

/// The overall feel the brand should convey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Vibe {
    #[default]
    Luxury,
    Fun,
    #[serde(rename = "Eco-Friendly")]
    EcoFriendly,
    Minimalist,
    Techy,
}

impl Vibe {
    /// Every vibe, in the order the form offers them.
    pub const ALL: [Vibe; 5] = [
        Vibe::Luxury,
        Vibe::Fun,
        Vibe::EcoFriendly,
        Vibe::Minimalist,
        Vibe::Techy,
    ];

    /// Human-readable label, as shown in forms and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Vibe::Luxury => "Luxury",
            Vibe::Fun => "Fun",
            Vibe::EcoFriendly => "Eco-Friendly",
            Vibe::Minimalist => "Minimalist",
            Vibe::Techy => "Techy",
        }
    }
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Vibe {
    type Err = BrandKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalised.as_str() {
            "luxury" => Ok(Vibe::Luxury),
            "fun" => Ok(Vibe::Fun),
            "eco" | "ecofriendly" => Ok(Vibe::EcoFriendly),
            "minimalist" | "minimal" => Ok(Vibe::Minimalist),
            "techy" | "tech" => Ok(Vibe::Techy),
            _ => Err(BrandKitError::InvalidBrief {
                field: "vibe",
                reason: format!(
                    "'{}' is not one of: {}",
                    s.trim(),
                    Vibe::ALL.map(Vibe::label).join(", ")
                ),
            }),
        }
    }
}

/// An sRGB colour written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// Black or white, whichever contrasts more with this colour.
    pub fn contrast_text(&self) -> HexColor {
        // 0.179 is where black and white give equal contrast ratios.
        if self.relative_luminance() > 0.179 {
            HexColor::new(0, 0, 0)
        } else {
            HexColor::new(0xFF, 0xFF, 0xFF)
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = BrandKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BrandKitError::InvalidColor {
            value: s.to_string(),
        };
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let digits: Vec<u8> = hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();
        match digits.as_slice() {
            [r, g, b] => Ok(HexColor::new(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Ok(HexColor::new(
                r1 * 16 + r2,
                g1 * 16 + g2,
                b1 * 16 + b2,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = BrandKitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Validated user input for one brand kit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandBrief {
    brand_name: String,
    industry: String,
    vibe: Vibe,
    theme_color: HexColor,
}

impl BrandBrief {
    /// Build a brief, trimming and validating every field.
    ///
    /// # Errors
    /// [`BrandKitError::InvalidBrief`] when the brand name or industry is
    /// blank or longer than [`MAX_FIELD_CHARS`].
    pub fn new(
        brand_name: impl AsRef<str>,
        industry: impl AsRef<str>,
        vibe: Vibe,
        theme_color: HexColor,
    ) -> Result<Self, BrandKitError> {
        Ok(Self {
            brand_name: validate_field("brand_name", brand_name.as_ref())?,
            industry: validate_field("industry", industry.as_ref())?,
            vibe,
            theme_color,
        })
    }

    pub fn brand_name(&self) -> &str {
        &self.brand_name
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn vibe(&self) -> Vibe {
        self.vibe
    }

    pub fn theme_color(&self) -> HexColor {
        self.theme_color
    }

    /// A filesystem-safe stem derived from the brand name.
    ///
    /// Whitespace runs, path separators and control characters collapse to a
    /// single `_`; leading dots are dropped so the file is never hidden.
    /// Falls back to `brand` when nothing usable is left.
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.brand_name.len());
        let mut pending_sep = false;
        for ch in self.brand_name.chars() {
            let is_sep = ch.is_whitespace()
                || ch.is_control()
                || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
            if is_sep {
                pending_sep = true;
                continue;
            }
            if pending_sep && !stem.is_empty() {
                stem.push('_');
            }
            pending_sep = false;
            stem.push(ch);
        }
        let stem = stem.trim_start_matches('.');
        if stem.is_empty() {
            "brand".to_string()
        } else {
            stem.to_string()
        }
    }

    /// `<stem>_brand_guide.pdf`
    pub fn guide_file_name(&self) -> String {
        format!("{}_brand_guide.pdf", self.file_stem())
    }

    /// `<stem>_kit.zip`
    pub fn archive_file_name(&self) -> String {
        format!("{}_kit.zip", self.file_stem())
    }
}

fn validate_field(field: &'static str, value: &str) -> Result<String, BrandKitError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BrandKitError::InvalidBrief {
            field,
            reason: "must not be empty".into(),
        });
    }
    let chars = trimmed.chars().count();
    if chars > MAX_FIELD_CHARS {
        return Err(BrandKitError::InvalidBrief {
            field,
            reason: format!("is {chars} characters long (limit {MAX_FIELD_CHARS})"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(name: &str) -> BrandBrief {
        BrandBrief::new(name, "Coffee", Vibe::Fun, DEFAULT_THEME_COLOR).unwrap()
    }

    #[test]
    fn new_trims_fields() {
        let b = BrandBrief::new("  Acme  ", "\tRockets\n", Vibe::Techy, DEFAULT_THEME_COLOR)
            .unwrap();
        assert_eq!(b.brand_name(), "Acme");
        assert_eq!(b.industry(), "Rockets");
    }

    #[test]
    fn blank_name_rejected() {
        let err = BrandBrief::new("   ", "Coffee", Vibe::Fun, DEFAULT_THEME_COLOR).unwrap_err();
        assert!(matches!(
            err,
            BrandKitError::InvalidBrief {
                field: "brand_name",
                ..
            }
        ));
    }

    #[test]
    fn blank_industry_rejected() {
        let err = BrandBrief::new("Acme", "", Vibe::Fun, DEFAULT_THEME_COLOR).unwrap_err();
        assert!(matches!(
            err,
            BrandKitError::InvalidBrief {
                field: "industry",
                ..
            }
        ));
    }

    #[test]
    fn overlong_field_rejected() {
        let long = "x".repeat(MAX_FIELD_CHARS + 1);
        let err = BrandBrief::new(&long, "Coffee", Vibe::Fun, DEFAULT_THEME_COLOR).unwrap_err();
        assert!(err.to_string().contains("limit 120"), "got: {err}");
    }

    #[test]
    fn file_stem_is_filesystem_safe() {
        assert_eq!(brief("Bean There").file_stem(), "Bean_There");
        assert_eq!(brief("a / b\\c").file_stem(), "a_b_c");
        assert_eq!(brief("..hidden").file_stem(), "hidden");
        assert_eq!(brief("///").file_stem(), "brand");
        assert_eq!(brief("Café Olé").file_stem(), "Café_Olé");
    }

    #[test]
    fn output_file_names() {
        let b = brief("Bean There");
        assert_eq!(b.guide_file_name(), "Bean_There_brand_guide.pdf");
        assert_eq!(b.archive_file_name(), "Bean_There_kit.zip");
    }

    #[test]
    fn vibe_parsing_is_lenient() {
        assert_eq!("eco-friendly".parse::<Vibe>().unwrap(), Vibe::EcoFriendly);
        assert_eq!("Eco Friendly".parse::<Vibe>().unwrap(), Vibe::EcoFriendly);
        assert_eq!("eco".parse::<Vibe>().unwrap(), Vibe::EcoFriendly);
        assert_eq!(" LUXURY ".parse::<Vibe>().unwrap(), Vibe::Luxury);
        assert!("grunge".parse::<Vibe>().is_err());
    }

    #[test]
    fn vibe_display_matches_form_labels() {
        let labels: Vec<String> = Vibe::ALL.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            labels,
            ["Luxury", "Fun", "Eco-Friendly", "Minimalist", "Techy"]
        );
    }

    #[test]
    fn hex_color_parsing() {
        assert_eq!("#FF5733".parse::<HexColor>().unwrap(), DEFAULT_THEME_COLOR);
        assert_eq!("ff5733".parse::<HexColor>().unwrap(), DEFAULT_THEME_COLOR);
        assert_eq!(
            "#0af".parse::<HexColor>().unwrap(),
            HexColor::new(0x00, 0xAA, 0xFF)
        );
        assert!("#GG0000".parse::<HexColor>().is_err());
        assert!("#12345".parse::<HexColor>().is_err());
        assert!("".parse::<HexColor>().is_err());
    }

    #[test]
    fn hex_color_display_is_uppercase() {
        assert_eq!(HexColor::new(0x0a, 0xbc, 0xde).to_string(), "#0ABCDE");
    }

    #[test]
    fn contrast_text_picks_readable_colour() {
        assert_eq!(
            HexColor::new(0xFF, 0xFF, 0xFF).contrast_text(),
            HexColor::new(0, 0, 0)
        );
        assert_eq!(
            HexColor::new(0x10, 0x10, 0x40).contrast_text(),
            HexColor::new(0xFF, 0xFF, 0xFF)
        );
    }

    #[test]
    fn brief_serialises_with_labels() {
        let b = BrandBrief::new("Acme", "Rockets", Vibe::EcoFriendly, DEFAULT_THEME_COLOR)
            .unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"Eco-Friendly\""), "got: {json}");
        assert!(json.contains("\"#FF5733\""), "got: {json}");
    }
}
