//! One generation run: document in, layout and cross-reference report out.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::layout::{analyze_fill, ColumnDistribution, CompactLayoutEngine, FillAnalysis, LayoutCalculation};
use crate::models::document::AcademicDocument;
use crate::xref::{CrossReference, CrossReferenceSystem, ValidationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub title: String,
    pub layout: LayoutCalculation,
    pub distribution: ColumnDistribution,
    pub fill: FillAnalysis,
    pub references: Vec<CrossReference>,
    pub validation: Vec<ValidationResult>,
}

/// Reads and parses an `AcademicDocument` JSON file.
pub async fn load_document(path: &Path) -> Result<AcademicDocument, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read document '{}'", path.display()))?;
    AcademicDocument::from_json_slice(&bytes)
}

/// Pure and CPU-bound; async callers should run it under `spawn_blocking`.
pub fn run(
    document: &AcademicDocument,
    engine: &CompactLayoutEngine,
    system: &CrossReferenceSystem,
) -> Result<GenerationReport, AppError> {
    let layout = engine.calculate_layout();
    let blocks = engine.blocks_from_document(document);
    let distribution = engine.distribute_content(blocks)?;
    let fill = analyze_fill(&distribution, engine.column_capacity());

    let (references, validation) = system.generate_cross_references(document)?.into_parts();

    info!(
        title = %document.title,
        sections = document.section_count(),
        fill_ratio = fill.fill_ratio,
        verdict = ?fill.verdict,
        references = references.len(),
        "Generation complete"
    );

    Ok(GenerationReport {
        title: document.title.clone(),
        layout,
        distribution,
        fill,
        references,
        validation,
    })
}
