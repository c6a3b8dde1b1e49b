//! Content blocks: the placeable units of a compact page.
//!
//! Heights are estimated from a character-density model, not measured. The
//! estimate functions are pure so their constants can be tuned in isolation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::document::{AcademicDocument, Section};

/// Characters assumed per estimated line when sizing prose and examples.
pub const CHARS_PER_ESTIMATED_LINE: f64 = 80.0;
pub const HEADING_LINES: f64 = 1.0;
pub const INLINE_FORMULA_LINES: f64 = 1.5;
pub const DISPLAY_FORMULA_LINES: f64 = 3.0;
pub const MIN_EXAMPLE_LINES: f64 = 3.0;
pub const LIST_ITEM_LINES: f64 = 1.2;

/// Marker that identifies a multi-line display block inside formula source.
const DISPLAY_BLOCK_MARKER: &str = "\\begin{";

// ────────────────────────────────────────────────────────────────────────────
// Block types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Heading,
    Formula,
    Example,
    List,
    Text,
}

impl BlockType {
    /// Placement priority; higher is placed first.
    pub fn default_priority(self) -> i32 {
        match self {
            BlockType::Heading => 10,
            BlockType::Formula => 9,
            BlockType::Example => 8,
            BlockType::List => 6,
            BlockType::Text => 5,
        }
    }

    /// Only running prose and lists may continue in another column.
    pub fn default_breakable(self) -> bool {
        matches!(self, BlockType::Text | BlockType::List)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Formula => "formula",
            BlockType::Example => "example",
            BlockType::List => "list",
            BlockType::Text => "text",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One placeable unit. Lives for a single layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: String,
    /// Inches, at the typography of the engine that built the block.
    pub estimated_height: f64,
    pub breakable: bool,
    pub priority: i32,
}

impl ContentBlock {
    /// Builds a block with the type's default priority and breakability.
    pub fn new(
        id: impl Into<String>,
        block_type: BlockType,
        content: impl Into<String>,
        estimated_height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            block_type,
            content: content.into(),
            estimated_height,
            breakable: block_type.default_breakable(),
            priority: block_type.default_priority(),
        }
    }

    pub fn with_breakable(mut self, breakable: bool) -> Self {
        self.breakable = breakable;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Height estimation
// ────────────────────────────────────────────────────────────────────────────

/// Estimated printed lines for `content` rendered as `block_type`.
pub fn estimate_lines(content: &str, block_type: BlockType) -> f64 {
    let length = content.chars().count() as f64;
    match block_type {
        BlockType::Heading => HEADING_LINES,
        BlockType::Formula => {
            if content.contains(DISPLAY_BLOCK_MARKER) {
                DISPLAY_FORMULA_LINES
            } else {
                INLINE_FORMULA_LINES
            }
        }
        BlockType::Example => (length / CHARS_PER_ESTIMATED_LINE)
            .ceil()
            .max(MIN_EXAMPLE_LINES),
        BlockType::List => count_list_items(content) as f64 * LIST_ITEM_LINES,
        BlockType::Text => (length / CHARS_PER_ESTIMATED_LINE).ceil(),
    }
}

/// Estimated physical height in inches.
pub fn estimate_content_height(
    content: &str,
    block_type: BlockType,
    effective_line_height: f64,
) -> f64 {
    estimate_lines(content, block_type) * effective_line_height
}

/// Counts lines that open a list item: `-`, `*`, `+`, `•`, `\item`, or `1.` / `1)`.
pub fn count_list_items(content: &str) -> usize {
    content.lines().filter(|l| is_list_item(l)).count()
}

fn is_list_item(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with("\\item") {
        return true;
    }
    if let Some(rest) = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('+'))
        .or_else(|| line.strip_prefix('•'))
    {
        return rest.starts_with(' ');
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && matches!(line[digits..].chars().next(), Some('.') | Some(')'))
}

// ────────────────────────────────────────────────────────────────────────────
// Splitting
// ────────────────────────────────────────────────────────────────────────────

/// Where a breakable block may be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Cut at exactly `floor(len × ratio)` characters, possibly mid-word.
    #[default]
    CharacterCount,
    /// Back the cut off to the last whitespace before the character split point.
    WordBoundary,
}

impl FromStr for SplitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chars" | "character_count" => Ok(SplitStrategy::CharacterCount),
            "words" | "word_boundary" => Ok(SplitStrategy::WordBoundary),
            other => Err(format!("unknown split strategy '{other}' (expected chars or words)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome {
    Split {
        first: ContentBlock,
        remaining: ContentBlock,
    },
    /// The block could not be cut; the caller must treat it as non-fitting.
    Unsplit(ContentBlock),
}

/// Cuts `block` so its first part occupies `available_height`.
///
/// `first.content + remaining.content == block.content` for every split.
pub fn split_content_block(
    block: ContentBlock,
    available_height: f64,
    strategy: SplitStrategy,
) -> SplitOutcome {
    if !block.breakable || available_height <= 0.0 || block.estimated_height <= 0.0 {
        return SplitOutcome::Unsplit(block);
    }

    let char_len = block.content.chars().count();
    let split_ratio = available_height / block.estimated_height;
    let char_split = (char_len as f64 * split_ratio).floor() as usize;

    let split_point = match strategy {
        SplitStrategy::CharacterCount => char_split,
        SplitStrategy::WordBoundary => word_boundary_before(&block.content, char_split),
    };
    if split_point == 0 || split_point >= char_len {
        return SplitOutcome::Unsplit(block);
    }

    let byte_index = block
        .content
        .char_indices()
        .nth(split_point)
        .map(|(i, _)| i)
        .unwrap_or(block.content.len());

    let first_height = match strategy {
        SplitStrategy::CharacterCount => available_height,
        SplitStrategy::WordBoundary => {
            block.estimated_height * split_point as f64 / char_len as f64
        }
    };

    let (head, tail) = block.content.split_at(byte_index);
    let (head, tail) = (head.to_string(), tail.to_string());
    let first = ContentBlock {
        id: format!("{}-part1", block.id),
        content: head,
        estimated_height: first_height,
        ..block.clone()
    };
    let remaining = ContentBlock {
        id: format!("{}-part2", block.id),
        content: tail,
        estimated_height: block.estimated_height - first_height,
        ..block
    };
    SplitOutcome::Split { first, remaining }
}

/// Char index just past the last whitespace at or before `char_split`,
/// or `char_split` itself when the prefix has no whitespace.
fn word_boundary_before(content: &str, char_split: usize) -> usize {
    content
        .chars()
        .take(char_split)
        .enumerate()
        .filter(|(_, c)| c.is_whitespace())
        .last()
        .map(|(i, _)| i + 1)
        .unwrap_or(char_split)
}

// ────────────────────────────────────────────────────────────────────────────
// Document → blocks
// ────────────────────────────────────────────────────────────────────────────

/// Turns every section of `document` into blocks, in reading order.
///
/// Per section: one heading, one block per paragraph (list-only paragraphs
/// become list blocks), one per formula, one per worked example. Subsections
/// follow their parent.
pub fn blocks_from_document(
    document: &AcademicDocument,
    effective_line_height: f64,
) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    for part in &document.parts {
        for section in &part.sections {
            push_section_blocks(section, effective_line_height, &mut blocks);
        }
    }
    blocks
}

fn push_section_blocks(section: &Section, line_height: f64, out: &mut Vec<ContentBlock>) {
    let make = |id: String, block_type: BlockType, content: String| {
        let height = estimate_content_height(&content, block_type, line_height);
        ContentBlock::new(id, block_type, content, height)
    };

    out.push(make(
        format!("{}-h", section.section_number),
        BlockType::Heading,
        format!("{} {}", section.section_number, section.title),
    ));

    let paragraphs = section
        .content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty());
    for (i, paragraph) in paragraphs.enumerate() {
        let is_list = paragraph
            .lines()
            .filter(|l| !l.trim().is_empty())
            .all(is_list_item);
        let block_type = if is_list {
            BlockType::List
        } else {
            BlockType::Text
        };
        out.push(make(
            format!("{}-p{}", section.section_number, i + 1),
            block_type,
            paragraph.to_string(),
        ));
    }

    for formula in &section.formulas {
        out.push(make(formula.id.clone(), BlockType::Formula, formula.latex.clone()));
    }

    for example in &section.examples {
        out.push(make(
            example.id.clone(),
            BlockType::Example,
            format!("{}\n{}", example.title, example.full_text()),
        ));
    }

    for sub in &section.subsections {
        push_section_blocks(sub, line_height, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Formula, FormulaKind, Part, WorkedExample};

    const LH: f64 = 0.2;

    fn text_block(content: &str, height: f64) -> ContentBlock {
        ContentBlock::new("t1", BlockType::Text, content, height)
    }

    // ── defaults ────────────────────────────────────────────────────────────

    #[test]
    fn test_default_priorities_and_breakability() {
        assert_eq!(BlockType::Heading.default_priority(), 10);
        assert_eq!(BlockType::Formula.default_priority(), 9);
        assert_eq!(BlockType::Example.default_priority(), 8);
        assert_eq!(BlockType::List.default_priority(), 6);
        assert_eq!(BlockType::Text.default_priority(), 5);
        assert!(BlockType::Text.default_breakable());
        assert!(BlockType::List.default_breakable());
        assert!(!BlockType::Heading.default_breakable());
        assert!(!BlockType::Formula.default_breakable());
        assert!(!BlockType::Example.default_breakable());
    }

    // ── estimate_content_height ─────────────────────────────────────────────

    #[test]
    fn test_heading_is_one_line() {
        let h = estimate_content_height("1.1 A very long heading indeed", BlockType::Heading, LH);
        assert!((h - LH).abs() < 1e-12);
    }

    #[test]
    fn test_formula_inline_vs_display() {
        let inline = estimate_content_height("a^2 + b^2 = c^2", BlockType::Formula, LH);
        let display = estimate_content_height(
            "\\begin{align} x &= 1 \\\\ y &= 2 \\end{align}",
            BlockType::Formula,
            LH,
        );
        assert!((inline - 1.5 * LH).abs() < 1e-12);
        assert!((display - 3.0 * LH).abs() < 1e-12);
    }

    #[test]
    fn test_example_has_three_line_floor() {
        let short = estimate_content_height("Tiny", BlockType::Example, LH);
        assert!((short - 3.0 * LH).abs() < 1e-12);
        let long = estimate_content_height(&"x".repeat(401), BlockType::Example, LH);
        assert!((long - 6.0 * LH).abs() < 1e-12);
    }

    #[test]
    fn test_list_counts_markers() {
        let list = "- alpha\n- beta\n* gamma\n1. delta\n\\item epsilon\nnot an item";
        assert_eq!(count_list_items(list), 5);
        let h = estimate_content_height(list, BlockType::List, LH);
        assert!((h - 5.0 * 1.2 * LH).abs() < 1e-12);
    }

    #[test]
    fn test_list_without_markers_has_no_height() {
        let h = estimate_content_height("plain words, no markers", BlockType::List, LH);
        assert_eq!(h, 0.0);
    }

    #[test]
    fn test_text_rounds_up_per_80_chars() {
        assert_eq!(estimate_lines(&"a".repeat(80), BlockType::Text), 1.0);
        assert_eq!(estimate_lines(&"a".repeat(81), BlockType::Text), 2.0);
        assert_eq!(estimate_lines("", BlockType::Text), 0.0);
    }

    #[test]
    fn test_estimate_counts_chars_not_bytes() {
        // 80 two-byte characters is still one line.
        assert_eq!(estimate_lines(&"é".repeat(80), BlockType::Text), 1.0);
    }

    // ── split_content_block ─────────────────────────────────────────────────

    #[test]
    fn test_split_preserves_content() {
        let original = "The quick brown fox jumps over the lazy dog";
        let block = text_block(original, 5.0);
        match split_content_block(block, 3.0, SplitStrategy::CharacterCount) {
            SplitOutcome::Split { first, remaining } => {
                assert_eq!(format!("{}{}", first.content, remaining.content), original);
                // floor(43 × 0.6) = 25
                assert_eq!(first.content.chars().count(), 25);
                assert!((first.estimated_height - 3.0).abs() < 1e-12);
                assert!((remaining.estimated_height - 2.0).abs() < 1e-12);
                assert_eq!(first.id, "t1-part1");
                assert_eq!(remaining.id, "t1-part2");
                assert!(remaining.breakable);
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_split_multibyte_content_on_char_boundary() {
        let original = "αβγδεζηθικ";
        let block = text_block(original, 1.0);
        match split_content_block(block, 0.5, SplitStrategy::CharacterCount) {
            SplitOutcome::Split { first, remaining } => {
                assert_eq!(first.content, "αβγδε");
                assert_eq!(remaining.content, "ζηθικ");
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_split_point_zero_returns_unsplit() {
        let block = text_block("abc", 10.0);
        // floor(3 × 0.1) = 0
        assert!(matches!(
            split_content_block(block, 1.0, SplitStrategy::CharacterCount),
            SplitOutcome::Unsplit(_)
        ));
    }

    #[test]
    fn test_non_breakable_or_no_room_is_unsplit() {
        let heading = ContentBlock::new("h", BlockType::Heading, "Heading text", 1.0);
        assert!(matches!(
            split_content_block(heading, 0.5, SplitStrategy::CharacterCount),
            SplitOutcome::Unsplit(_)
        ));
        let text = text_block("some text", 1.0);
        assert!(matches!(
            split_content_block(text, 0.0, SplitStrategy::CharacterCount),
            SplitOutcome::Unsplit(_)
        ));
    }

    #[test]
    fn test_word_boundary_split_backs_off_to_space() {
        let original = "alpha beta gamma delta";
        let block = text_block(original, 2.2);
        // char split = floor(22 × 0.5) = 11 → "alpha beta " (boundary after index 10)
        match split_content_block(block, 1.1, SplitStrategy::WordBoundary) {
            SplitOutcome::Split { first, remaining } => {
                assert_eq!(first.content, "alpha beta ");
                assert_eq!(remaining.content, "gamma delta");
                let total = first.estimated_height + remaining.estimated_height;
                assert!((total - 2.2).abs() < 1e-12);
                assert!(first.estimated_height <= 1.1 + 1e-12);
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_split_strategy_parse() {
        assert_eq!("words".parse::<SplitStrategy>(), Ok(SplitStrategy::WordBoundary));
        assert_eq!("chars".parse::<SplitStrategy>(), Ok(SplitStrategy::CharacterCount));
        assert!("sentences".parse::<SplitStrategy>().is_err());
    }

    // ── blocks_from_document ────────────────────────────────────────────────

    #[test]
    fn test_blocks_from_document_reading_order() {
        let doc = AcademicDocument {
            title: "Stats".to_string(),
            parts: vec![Part {
                part_number: 1,
                title: "Basics".to_string(),
                sections: vec![Section {
                    section_number: "1.1".to_string(),
                    title: "Counting".to_string(),
                    content: "Intro paragraph.\n\n- one\n- two\n\nClosing words.".to_string(),
                    formulas: vec![Formula {
                        id: "1.1.1".to_string(),
                        latex: "n!".to_string(),
                        context: "Factorial".to_string(),
                        kind: FormulaKind::Formula,
                        is_key_formula: false,
                    }],
                    examples: vec![WorkedExample {
                        id: "Ex.1.1.1".to_string(),
                        title: "Arrangements".to_string(),
                        problem: "Arrange 3 books.".to_string(),
                        solution: vec![],
                        subtopic: None,
                    }],
                    subsections: vec![Section {
                        section_number: "1.1.1a".to_string(),
                        title: "Aside".to_string(),
                        content: String::new(),
                        formulas: vec![],
                        examples: vec![],
                        subsections: vec![],
                    }],
                }],
            }],
            metadata: Default::default(),
        };

        let blocks = blocks_from_document(&doc, LH);
        let summary: Vec<(&str, BlockType)> =
            blocks.iter().map(|b| (b.id.as_str(), b.block_type)).collect();
        assert_eq!(
            summary,
            vec![
                ("1.1-h", BlockType::Heading),
                ("1.1-p1", BlockType::Text),
                ("1.1-p2", BlockType::List),
                ("1.1-p3", BlockType::Text),
                ("1.1.1", BlockType::Formula),
                ("Ex.1.1.1", BlockType::Example),
                ("1.1.1a-h", BlockType::Heading),
            ]
        );
        assert_eq!(blocks[0].content, "1.1 Counting");
        assert!(blocks.iter().all(|b| b.estimated_height > 0.0));
    }
}
