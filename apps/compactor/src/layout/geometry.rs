//! Physical page geometry and line metrics.
//!
//! All lengths are in inches. Font sizes are in PostScript points (72pt/in).
//! Character capacity uses a fixed average glyph width rather than real font
//! metrics: good enough for one-pass planning, not for typesetting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f64 = 72.0;

/// Average glyph advance as a fraction of the font size.
pub const AVERAGE_GLYPH_WIDTH_EM: f64 = 0.6;

// ────────────────────────────────────────────────────────────────────────────
// Paper
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// `(width, height)` in inches, portrait orientation.
    pub fn dimensions_in(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaperSize::A4 => "a4",
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" => Ok(PaperSize::Letter),
            "legal" => Ok(PaperSize::Legal),
            other => Err(format!("unknown paper size '{other}' (expected a4, letter or legal)")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Margins
// ────────────────────────────────────────────────────────────────────────────

/// Page margins and the gutter between adjacent columns, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub column_gap: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.5,
            bottom: 0.5,
            left: 0.5,
            right: 0.5,
            column_gap: 0.25,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line metrics
// ────────────────────────────────────────────────────────────────────────────

pub fn points_to_inches(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

pub fn inches_to_points(inches: f64) -> f64 {
    inches * POINTS_PER_INCH
}

/// Baseline-to-baseline distance in inches.
pub fn effective_line_height_in(font_size_pt: f64, line_height: f64) -> f64 {
    points_to_inches(font_size_pt * line_height)
}

/// Approximate characters that fit on one line of a column `column_width_in` wide.
pub fn chars_per_line(column_width_in: f64, font_size_pt: f64) -> u32 {
    let glyph_width_pt = font_size_pt * AVERAGE_GLYPH_WIDTH_EM;
    if glyph_width_pt <= 0.0 || column_width_in <= 0.0 {
        return 0;
    }
    (inches_to_points(column_width_in) / glyph_width_pt).floor() as u32
}
