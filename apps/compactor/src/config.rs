use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::layout::{PaperSize, PartialLayoutConfig, SplitStrategy};
use crate::xref::CrossReferenceConfig;

/// Run configuration loaded from environment variables (and `.env`).
/// Bounds are checked by the layout engine, not here.
#[derive(Debug, Clone)]
pub struct Config {
    pub document: Option<PathBuf>,
    pub paper_size: PaperSize,
    pub columns: u8,
    pub font_size_pt: f64,
    pub line_height: f64,
    pub confidence_threshold: f64,
    pub max_distance: usize,
    pub split_strategy: SplitStrategy,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            document: get("COMPACTOR_DOCUMENT").map(PathBuf::from),
            paper_size: parse_or(&get, "COMPACTOR_PAPER_SIZE", PaperSize::A4)?,
            columns: parse_or(&get, "COMPACTOR_COLUMNS", 2)?,
            font_size_pt: parse_or(&get, "COMPACTOR_FONT_SIZE_PT", 10.5)?,
            line_height: parse_or(&get, "COMPACTOR_LINE_HEIGHT", 1.2)?,
            confidence_threshold: parse_or(&get, "COMPACTOR_CONFIDENCE_THRESHOLD", 0.6)?,
            max_distance: parse_or(&get, "COMPACTOR_MAX_DISTANCE", 5)?,
            split_strategy: parse_or(&get, "COMPACTOR_SPLIT_STRATEGY", SplitStrategy::default())?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// A path given on the command line wins over `COMPACTOR_DOCUMENT`.
    pub fn document_path(&self, cli_arg: Option<PathBuf>) -> Result<PathBuf> {
        cli_arg.or_else(|| self.document.clone()).context(
            "Required environment variable 'COMPACTOR_DOCUMENT' is not set and no document path was given",
        )
    }

    pub fn layout_config(&self) -> PartialLayoutConfig {
        PartialLayoutConfig {
            paper_size: Some(self.paper_size),
            columns: Some(self.columns),
            font_size_pt: Some(self.font_size_pt),
            line_height: Some(self.line_height),
            ..Default::default()
        }
    }

    pub fn cross_reference_config(&self) -> CrossReferenceConfig {
        CrossReferenceConfig {
            confidence_threshold: self.confidence_threshold,
            max_distance: self.max_distance,
            ..Default::default()
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Environment variable '{key}' has invalid value '{raw}': {e}")),
    }
}
