// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The synchronous assembly pipeline the commands run on a blocking thread:
// import steps, then edits, then export.

use pagewerk_assembly::{AssemblyExporter, ExportedDocument, ImportOutcome, PendingImport, Workspace};
use pagewerk_core::error::Result;
use pagewerk_core::human_errors::humanize_error;
use pagewerk_core::{AssemblyConfig, InsertionMode, MediaKind, PagewerkError, SourceAsset};
use pagewerk_document::{SourceDecoder, preview_renderer};
use tracing::{debug, info, warn};

use crate::plan::Operation;

/// One import pass: the assets, an optional page range, and where the new
/// pages go.
#[derive(Debug, Clone)]
pub struct ImportStep {
    pub assets: Vec<SourceAsset>,
    pub range: Option<String>,
    pub mode: InsertionMode,
}

/// Where and how the result is written.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub name: Option<String>,
    pub title: Option<String>,
}

/// Everything the pipeline produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub document: ExportedDocument,
    pub imports: Vec<ImportOutcome>,
}

pub fn run(
    config: &AssemblyConfig,
    steps: Vec<ImportStep>,
    operations: &[Operation],
    output: &OutputOptions,
) -> Result<PipelineReport> {
    let renderer = preview_renderer();
    let decoder = SourceDecoder::new(renderer.as_ref(), config.effective_preview_scale());
    let mut workspace = Workspace::new();

    let mut imports = Vec::with_capacity(steps.len());
    for (index, step) in steps.into_iter().enumerate() {
        let outcome = import(&mut workspace, &decoder, config, step)?;
        info!(step = index + 1, added = outcome.added, total = workspace.store().len(), "import step done");
        imports.push(outcome);
    }

    for operation in operations {
        operation.apply(&mut workspace)?;
    }

    let mut exporter = AssemblyExporter::new(config);
    if let Some(title) = &output.title {
        exporter = exporter.with_title(title.clone());
    }
    let document = exporter.export(&workspace, output.name.as_deref())?;

    Ok(PipelineReport { document, imports })
}

fn import(
    workspace: &mut Workspace,
    decoder: &SourceDecoder<'_>,
    config: &AssemblyConfig,
    step: ImportStep,
) -> Result<ImportOutcome> {
    let mut pending = PendingImport::stage(step.assets, config)?;
    if let Some(range) = &step.range {
        // A lone document that failed to parse offers no range; integration
        // records it as a failed asset instead of aborting the run.
        let unreadable_lead = !pending.offers_range()
            && matches!(pending.assets(), [only] if only.media_kind() == MediaKind::PaginatedDocument);
        if unreadable_lead {
            warn!(range = %range, "document unreadable, page range ignored");
        } else {
            pending.set_range(range)?;
        }
    }
    pending.set_mode(step.mode);

    let batch = pending.integrate(decoder, &mut |progress| {
        debug!(
            asset = progress.asset_name,
            asset_index = progress.asset_index + 1,
            asset_count = progress.asset_count,
            pages_done = progress.pages_done,
            pages_total = progress.pages_total,
            "decoding"
        );
    })?;

    let outcome = workspace.commit(batch);
    for failure in &outcome.failures {
        let human = humanize_error(&PagewerkError::Decode {
            source_name: failure.name.clone(),
            reason: failure.reason.clone(),
        });
        warn!(name = %failure.name, reason = %failure.reason, "{}", human.message);
    }
    for skipped in &outcome.skipped {
        warn!(name = %skipped.name, media_type = %skipped.media_type, "unsupported file skipped");
    }
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pagewerk_core::Edge;
    use pagewerk_document::{PdfReader, PdfWriter};

    /// A single-page PDF made from a `width` x `height` image.
    pub(crate) fn image_pdf(name: &str, width: u32, height: u32) -> SourceAsset {
        let png = png(width, height);
        let bytes = PdfWriter::new()
            .create_image_page(&png, pagewerk_core::Rotation::NONE)
            .expect("image page");
        SourceAsset::new(name, "application/pdf", bytes)
    }

    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        pagewerk_document::ImageProcessor::from_dynamic(image::DynamicImage::new_rgb8(width, height))
            .to_png_bytes()
            .expect("encode png")
    }

    fn step(assets: Vec<SourceAsset>, mode: InsertionMode) -> ImportStep {
        ImportStep {
            assets,
            range: None,
            mode,
        }
    }

    #[test]
    fn steps_then_edits_then_export() {
        let config = AssemblyConfig::default();
        let steps = vec![
            step(vec![image_pdf("a.pdf", 100, 100), image_pdf("b.pdf", 200, 200)], InsertionMode::Append),
            step(vec![image_pdf("c.pdf", 300, 300)], InsertionMode::Prepend),
        ];
        let operations = vec![
            Operation::Select { range: "1".into() },
            Operation::MoveToEdge { edge: Edge::End },
            Operation::SelectAll,
            Operation::Rotate { degrees: 180 },
        ];

        let report = run(&config, steps, &operations, &OutputOptions::default()).expect("run");
        assert_eq!(report.document.page_count, 3);
        assert_eq!(report.imports.len(), 2);

        let reader = PdfReader::from_bytes(&report.document.bytes).expect("reload");
        let widths: Vec<i64> = (0..3)
            .map(|index| reader.page_geometry(index).expect("geometry").width_pt.round() as i64)
            .collect();
        assert_eq!(widths, vec![100, 200, 300]);
        assert_eq!(reader.page_geometry(0).expect("geometry").rotation.degrees(), 180);
    }

    #[test]
    fn range_on_a_mixed_step_is_rejected() {
        let config = AssemblyConfig::default();
        let steps = vec![ImportStep {
            assets: vec![image_pdf("a.pdf", 10, 10), image_pdf("b.pdf", 10, 10)],
            range: Some("1".into()),
            mode: InsertionMode::Append,
        }];
        let result = run(&config, steps, &[], &OutputOptions::default());
        assert!(matches!(result, Err(PagewerkError::RangeNotOffered)));
    }

    #[test]
    fn all_inputs_failing_leaves_nothing_to_export() {
        let config = AssemblyConfig::default();
        let steps = vec![step(
            vec![SourceAsset::new("bad.pdf", "application/pdf", b"junk".to_vec())],
            InsertionMode::Append,
        )];
        let result = run(&config, steps, &[], &OutputOptions::default());
        assert!(matches!(result, Err(PagewerkError::EmptyAssembly)));
    }

    #[test]
    fn unreadable_document_with_a_range_fails_alone() {
        let config = AssemblyConfig::default();
        let ranged = |asset: SourceAsset| ImportStep {
            assets: vec![asset],
            range: Some("1".into()),
            mode: InsertionMode::Append,
        };
        let steps = vec![
            ranged(image_pdf("good.pdf", 50, 50)),
            ranged(SourceAsset::new("bad.pdf", "application/pdf", b"junk".to_vec())),
        ];

        let report = run(&config, steps, &[], &OutputOptions::default()).expect("run");
        assert_eq!(report.document.page_count, 1);
        assert_eq!(report.imports[0].added, 1);
        assert_eq!(report.imports[1].added, 0);
        assert_eq!(report.imports[1].failures.len(), 1);
        assert_eq!(report.imports[1].failures[0].name, "bad.pdf");
    }
}
