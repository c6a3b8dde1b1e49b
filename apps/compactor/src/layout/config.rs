//! Compact layout configuration and its density invariants.
//!
//! Callers supply a `PartialLayoutConfig`; missing fields come from the
//! defaults (A4, 2 columns, 10.5pt at 1.2 line height, 0.3em paragraphs,
//! 0.2em lists). The merged config is checked once at construction.

use serde::{Deserialize, Serialize};

use crate::layout::geometry::{Margins, PaperSize};
use crate::layout::LayoutError;

pub const MIN_FONT_SIZE_PT: f64 = 8.0;
pub const MAX_FONT_SIZE_PT: f64 = 14.0;
pub const MIN_LINE_HEIGHT: f64 = 1.0;
pub const MAX_LINE_HEIGHT: f64 = 2.0;
pub const MAX_PARAGRAPH_SPACING_EM: f64 = 0.35;
pub const MAX_LIST_SPACING_EM: f64 = 0.25;
pub const MIN_COLUMNS: u8 = 1;
pub const MAX_COLUMNS: u8 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Config types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font_size_pt: f64,
    pub line_height: f64,
    pub font_families: Vec<String>,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_size_pt: 10.5,
            line_height: 1.2,
            font_families: vec!["Latin Modern Roman".to_string(), "serif".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingMargins {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub paragraph_spacing_em: f64,
    pub list_spacing_em: f64,
    pub section_spacing_em: f64,
    pub heading_margins: HeadingMargins,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            paragraph_spacing_em: 0.3,
            list_spacing_em: 0.2,
            section_spacing_em: 0.5,
            heading_margins: HeadingMargins {
                top: 0.4,
                bottom: 0.2,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayEquations {
    pub centered: bool,
    pub numbered: bool,
    pub full_width: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InlineEquations {
    pub preserve_inline: bool,
    pub max_height_em: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MathRendering {
    pub display_equations: DisplayEquations,
    pub inline_equations: InlineEquations,
}

impl Default for MathRendering {
    fn default() -> Self {
        Self {
            display_equations: DisplayEquations {
                centered: true,
                numbered: false,
                full_width: false,
            },
            inline_equations: InlineEquations {
                preserve_inline: true,
                max_height_em: 1.2,
            },
        }
    }
}

/// Fully merged layout configuration. Immutable for the length of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactLayoutConfig {
    pub paper_size: PaperSize,
    pub columns: u8,
    pub typography: Typography,
    pub spacing: Spacing,
    pub margins: Margins,
    pub math_rendering: MathRendering,
}

impl Default for CompactLayoutConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            columns: 2,
            typography: Typography::default(),
            spacing: Spacing::default(),
            margins: Margins::default(),
            math_rendering: MathRendering::default(),
        }
    }
}

/// Caller-facing configuration: every field optional, merged over a base config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialLayoutConfig {
    pub paper_size: Option<PaperSize>,
    pub columns: Option<u8>,
    pub font_size_pt: Option<f64>,
    pub line_height: Option<f64>,
    pub font_families: Option<Vec<String>>,
    pub paragraph_spacing_em: Option<f64>,
    pub list_spacing_em: Option<f64>,
    pub section_spacing_em: Option<f64>,
    pub heading_margins: Option<HeadingMargins>,
    pub margins: Option<Margins>,
    pub math_rendering: Option<MathRendering>,
}

impl PartialLayoutConfig {
    /// Overlays every present field on `base`.
    pub fn apply_to(self, base: &CompactLayoutConfig) -> CompactLayoutConfig {
        let mut merged = base.clone();
        if let Some(v) = self.paper_size {
            merged.paper_size = v;
        }
        if let Some(v) = self.columns {
            merged.columns = v;
        }
        if let Some(v) = self.font_size_pt {
            merged.typography.font_size_pt = v;
        }
        if let Some(v) = self.line_height {
            merged.typography.line_height = v;
        }
        if let Some(v) = self.font_families {
            merged.typography.font_families = v;
        }
        if let Some(v) = self.paragraph_spacing_em {
            merged.spacing.paragraph_spacing_em = v;
        }
        if let Some(v) = self.list_spacing_em {
            merged.spacing.list_spacing_em = v;
        }
        if let Some(v) = self.section_spacing_em {
            merged.spacing.section_spacing_em = v;
        }
        if let Some(v) = self.heading_margins {
            merged.spacing.heading_margins = v;
        }
        if let Some(v) = self.margins {
            merged.margins = v;
        }
        if let Some(v) = self.math_rendering {
            merged.math_rendering = v;
        }
        merged
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

impl CompactLayoutConfig {
    /// Checks the density invariants. The first violation wins.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let font = self.typography.font_size_pt;
        if !(MIN_FONT_SIZE_PT..=MAX_FONT_SIZE_PT).contains(&font) {
            return Err(invalid(
                "font_size_pt",
                font,
                format!("must be between {MIN_FONT_SIZE_PT}pt and {MAX_FONT_SIZE_PT}pt"),
            ));
        }

        let line_height = self.typography.line_height;
        if !(MIN_LINE_HEIGHT..=MAX_LINE_HEIGHT).contains(&line_height) {
            return Err(invalid(
                "line_height",
                line_height,
                format!("must be between {MIN_LINE_HEIGHT} and {MAX_LINE_HEIGHT}"),
            ));
        }

        let paragraph = self.spacing.paragraph_spacing_em;
        if !(0.0..=MAX_PARAGRAPH_SPACING_EM).contains(&paragraph) {
            return Err(invalid(
                "paragraph_spacing_em",
                paragraph,
                format!("must not exceed {MAX_PARAGRAPH_SPACING_EM}em"),
            ));
        }

        let list = self.spacing.list_spacing_em;
        if !(0.0..=MAX_LIST_SPACING_EM).contains(&list) {
            return Err(invalid(
                "list_spacing_em",
                list,
                format!("must not exceed {MAX_LIST_SPACING_EM}em"),
            ));
        }

        if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&self.columns) {
            return Err(invalid(
                "columns",
                f64::from(self.columns),
                format!("must be between {MIN_COLUMNS} and {MAX_COLUMNS}"),
            ));
        }

        self.validate_geometry()
    }

    /// Margins must be non-negative and leave a positive column on the page.
    fn validate_geometry(&self) -> Result<(), LayoutError> {
        let m = &self.margins;
        for (field, value) in [
            ("margins.top", m.top),
            ("margins.bottom", m.bottom),
            ("margins.left", m.left),
            ("margins.right", m.right),
            ("margins.column_gap", m.column_gap),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(field, value, "must be non-negative".to_string()));
            }
        }

        let (page_w, page_h) = self.paper_size.dimensions_in();
        let content_h = page_h - m.top - m.bottom;
        if content_h <= 0.0 {
            return Err(invalid(
                "margins",
                content_h,
                "top and bottom margins leave no content height".to_string(),
            ));
        }

        let gaps = f64::from(self.columns.saturating_sub(1)) * m.column_gap;
        let column_w = (page_w - m.left - m.right - gaps) / f64::from(self.columns);
        if column_w <= 0.0 {
            return Err(invalid(
                "margins",
                column_w,
                "side margins and column gaps leave no column width".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: f64, reason: String) -> LayoutError {
    LayoutError::InvalidConfig {
        field,
        value,
        reason,
    }
}
