//! Brand-guide layout: every drawing operation, computed without pdfium.
//!
//! Separating *where things go* from *how pdfium draws them* keeps the page
//! geometry unit-testable on machines without the pdfium library. The
//! renderer in [`super::guide`] simply replays [`DrawOp`]s.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of a
//! US-Letter page (612 × 792 pt).
//!
//! ```text
//!  750  Brand Guide: {name}                     (Helvetica-Bold 18)
//!  720  ┌────────┐  Palette
//!       │  logo  │  ■ ■ ■ ■ ■
//!  600  └────────┘  #hex …
//!  570  Industry: …                             (Helvetica 12)
//!  550  Vibe: …
//!  530  Theme Color: …
//!  510  ---------------------------------------
//!  490  copy, 14.4 pt leading, wrapped, continues on new pages
//! ```

use crate::brief::{BrandBrief, HexColor};
use crate::palette::Palette;
use serde::Serialize;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const LEFT_MARGIN: f32 = 100.0;
pub const BOTTOM_MARGIN: f32 = 72.0;

pub const TITLE_Y: f32 = 750.0;
pub const TITLE_SIZE: f32 = 18.0;

pub const LOGO_X: f32 = 100.0;
pub const LOGO_Y: f32 = 600.0;
pub const LOGO_SIZE: f32 = 120.0;

pub const SWATCH_X: f32 = 240.0;
pub const SWATCH_Y: f32 = 650.0;
pub const SWATCH_SIZE: f32 = 44.0;
pub const SWATCH_STEP: f32 = 56.0;
/// Swatches that fit in one row right of the logo.
pub const MAX_SWATCHES: usize = 5;

pub const BODY_SIZE: f32 = 12.0;
pub const DETAILS_Y: [f32; 4] = [570.0, 550.0, 530.0, 510.0];
pub const COPY_START_Y: f32 = 490.0;
/// 1.2 × the body font size.
pub const LEADING: f32 = 14.4;
/// Where copy resumes on continuation pages.
pub const CONTINUATION_Y: f32 = 750.0;
/// Characters per copy line; roughly the 440 pt text column at 12 pt Helvetica.
pub const WRAP_COLUMNS: usize = 80;
/// Characters of title that fit across the page at 18 pt Helvetica-Bold.
pub const TITLE_COLUMNS: usize = 45;

const RULE: &str = "---------------------------------------";

/// Standard PDF fonts used by the guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
    },
    /// The logo, scaled to fit the box.
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// A filled rectangle.
    Swatch {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: HexColor,
    },
}

/// The complete guide: one list of operations per page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideLayout {
    pages: Vec<Vec<DrawOp>>,
}

impl GuideLayout {
    /// Lay out the guide for a brief, its palette and copy.
    pub fn build(brief: &BrandBrief, palette: &Palette, copy: &str, has_logo: bool) -> Self {
        let mut first = Vec::new();

        first.push(text(
            LEFT_MARGIN,
            TITLE_Y,
            truncate_line(
                &format!("Brand Guide: {}", brief.brand_name()),
                TITLE_COLUMNS,
            ),
            Font::HelveticaBold,
            TITLE_SIZE,
        ));

        if has_logo {
            first.push(DrawOp::Logo {
                x: LOGO_X,
                y: LOGO_Y,
                width: LOGO_SIZE,
                height: LOGO_SIZE,
            });
        }

        push_palette(&mut first, palette);

        let details = [
            truncate_line(&format!("Industry: {}", brief.industry()), WRAP_COLUMNS),
            format!("Vibe: {}", brief.vibe()),
            format!("Theme Color: {}", brief.theme_color()),
            RULE.to_string(),
        ];
        for (line, y) in details.into_iter().zip(DETAILS_Y) {
            first.push(text(LEFT_MARGIN, y, line, Font::Helvetica, BODY_SIZE));
        }

        let mut pages = vec![first];
        let mut y = COPY_START_Y;
        for line in copy.lines().flat_map(|l| wrap_line(&to_win_ansi(l), WRAP_COLUMNS)) {
            if y < BOTTOM_MARGIN {
                pages.push(Vec::new());
                y = CONTINUATION_Y;
            }
            match pages.last_mut() {
                Some(page) if !line.is_empty() => {
                    page.push(text(LEFT_MARGIN, y, line, Font::Helvetica, BODY_SIZE));
                }
                _ => {}
            }
            y -= LEADING;
        }

        Self { pages }
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Consume the layout, yielding its pages.
    pub fn into_pages(self) -> Vec<Vec<DrawOp>> {
        self.pages
    }
}

fn text(x: f32, y: f32, text: String, font: Font, size: f32) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        text: to_win_ansi(&text),
        font,
        size,
    }
}

fn push_palette(ops: &mut Vec<DrawOp>, palette: &Palette) {
    ops.push(text(
        SWATCH_X,
        SWATCH_Y + SWATCH_SIZE + 12.0,
        "Palette".to_string(),
        Font::HelveticaBold,
        10.0,
    ));
    for (i, color) in palette.colors().iter().take(MAX_SWATCHES).enumerate() {
        let x = SWATCH_X + i as f32 * SWATCH_STEP;
        ops.push(DrawOp::Swatch {
            x,
            y: SWATCH_Y,
            width: SWATCH_SIZE,
            height: SWATCH_SIZE,
            fill: *color,
        });
        ops.push(text(
            x,
            SWATCH_Y - 12.0,
            color.to_string(),
            Font::Helvetica,
            7.0,
        ));
    }
}

/// Shorten a header line to `columns` characters, ending in `...` when cut.
///
/// Header lines sit at fixed positions, so they are never wrapped.
pub fn truncate_line(line: &str, columns: usize) -> String {
    let line = to_win_ansi(line);
    if line.chars().count() <= columns {
        return line;
    }
    let kept: String = line.chars().take(columns.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Greedy word wrap at `columns` characters; over-long words are split.
///
/// An empty input line yields one empty line so paragraph breaks survive.
pub fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > columns {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Map text onto what the standard Helvetica fonts can draw.
///
/// Typographic punctuation becomes its ASCII equivalent; anything else
/// outside Latin-1 (emoji, CJK) is dropped rather than drawn as boxes.
pub fn to_win_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' => out.push('-'),
            '\u{00A0}' | '\u{2002}'..='\u{200A}' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => {}
        }
    }
    out
}
