// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::path::{Path, PathBuf};

use pagewerk_assembly::ExportedDocument;
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::human_errors::humanize_error;
use pagewerk_core::{AssemblyConfig, InsertionMode, MediaKind};
use pagewerk_document::ImageProcessor;
use pagewerk_document::decode::open_document;
use tracing::info;

use crate::plan::{Operation, Plan};
use crate::services::pipeline::{self, ImportStep, OutputOptions, PipelineReport};
use crate::services::sources;

/// Options of `pagewerk merge`.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub inputs: Vec<PathBuf>,
    pub output: Option<String>,
    pub out_dir: PathBuf,
    pub range: Option<String>,
    pub mode: InsertionMode,
    pub rotate: Option<i32>,
    pub title: Option<String>,
}

/// Each input is its own import step, so `--mode` decides how every file
/// after the first joins the pages before it. `--range` applies to each PDF.
pub async fn merge(config: AssemblyConfig, options: MergeOptions) -> Result<()> {
    let assets = sources::read_assets(&options.inputs).await?;

    let steps: Vec<ImportStep> = assets
        .into_iter()
        .enumerate()
        .map(|(index, asset)| {
            let range = match asset.media_kind() {
                MediaKind::PaginatedDocument => options.range.clone(),
                _ => None,
            };
            ImportStep {
                assets: vec![asset],
                range,
                mode: if index == 0 { InsertionMode::Append } else { options.mode },
            }
        })
        .collect();

    let operations = match options.rotate {
        Some(degrees) => vec![Operation::SelectAll, Operation::Rotate { degrees }],
        None => Vec::new(),
    };
    let output = OutputOptions {
        name: options.output,
        title: options.title,
    };

    let report = run_blocking(config, steps, operations, output).await?;
    finish(report, &options.out_dir).await
}

/// `pagewerk plan`: run a JSON plan.
pub async fn plan(config: AssemblyConfig, plan_path: &Path, out_dir: Option<PathBuf>) -> Result<()> {
    let mut plan = Plan::load(plan_path).await?;
    let base = plan_path.parent().map(Path::to_path_buf).unwrap_or_default();
    plan.resolve_paths(&base);

    let mut steps = Vec::with_capacity(plan.imports.len());
    for import in &plan.imports {
        steps.push(ImportStep {
            assets: sources::read_assets(&import.files).await?,
            range: import.range.clone(),
            mode: import.mode,
        });
    }
    let output = OutputOptions {
        name: plan.output.name.clone(),
        title: plan.output.title.clone(),
    };

    let report = run_blocking(config, steps, plan.operations, output).await?;
    finish(report, &out_dir.unwrap_or(base)).await
}

/// `pagewerk inspect`: page count and geometry of one file.
pub async fn inspect(path: &Path) -> Result<()> {
    let asset = sources::read_asset(path).await?;
    let lines = tokio::task::spawn_blocking(move || describe(&asset))
        .await
        .map_err(|err| PagewerkError::Io(std::io::Error::other(err)))??;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn describe(asset: &pagewerk_core::SourceAsset) -> Result<Vec<String>> {
    let mut lines = vec![format!("{} ({})", asset.name, asset.media_type)];
    match asset.media_kind() {
        MediaKind::PaginatedDocument => {
            let reader = open_document(asset)?;
            lines.push(format!("pages: {}", reader.page_count()));
            for index in 0..reader.page_count() {
                let geometry = reader.page_geometry(index)?;
                let (width, height) = geometry.display_size();
                lines.push(format!(
                    "  {:>4}: {:.0} x {:.0} pt, rotation {}",
                    index + 1,
                    width,
                    height,
                    geometry.rotation
                ));
            }
        }
        MediaKind::Image => {
            let image = ImageProcessor::from_bytes(&asset.bytes)?;
            lines.push(format!("image: {} x {} px (one page)", image.width(), image.height()));
        }
        MediaKind::Unsupported => lines.push("unsupported: would be skipped on import".into()),
    }
    Ok(lines)
}

async fn run_blocking(
    config: AssemblyConfig,
    steps: Vec<ImportStep>,
    operations: Vec<Operation>,
    output: OutputOptions,
) -> Result<PipelineReport> {
    tokio::task::spawn_blocking(move || pipeline::run(&config, steps, &operations, &output))
        .await
        .map_err(|err| PagewerkError::Io(std::io::Error::other(err)))?
}

async fn finish(report: PipelineReport, out_dir: &Path) -> Result<()> {
    for outcome in &report.imports {
        for failure in &outcome.failures {
            let human = humanize_error(&PagewerkError::Decode {
                source_name: failure.name.clone(),
                reason: failure.reason.clone(),
            });
            eprintln!("warning: {} ({})", human.message, failure.reason);
        }
        for skipped in &outcome.skipped {
            eprintln!("warning: skipped {} ({} is not supported)", skipped.name, skipped.media_type);
        }
    }

    let path = write_output(&report.document, out_dir).await?;
    println!("{} ({} pages)", path.display(), report.document.page_count);
    Ok(())
}

async fn write_output(document: &ExportedDocument, out_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(out_dir).await?;
    let path = out_dir.join(&document.file_name);
    tokio::fs::write(&path, &document.bytes).await?;
    info!(path = %path.display(), bytes = document.bytes.len(), "output written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewerk_document::PdfReader;

    use crate::services::pipeline::tests::{image_pdf, png};

    fn options(inputs: Vec<PathBuf>, out_dir: &Path) -> MergeOptions {
        MergeOptions {
            inputs,
            output: Some("merged".into()),
            out_dir: out_dir.to_path_buf(),
            range: None,
            mode: InsertionMode::Append,
            rotate: None,
            title: None,
        }
    }

    #[tokio::test]
    async fn merge_writes_every_input_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = dir.path().join("a.pdf");
        let image = dir.path().join("b.png");
        std::fs::write(&pdf, &image_pdf("a.pdf", 40, 60).bytes[..]).expect("write pdf");
        std::fs::write(&image, png(30, 20)).expect("write png");

        let mut opts = options(vec![pdf, image], dir.path());
        opts.rotate = Some(90);
        merge(AssemblyConfig::default(), opts).await.expect("merge");

        let written = std::fs::read(dir.path().join("merged.pdf")).expect("output");
        let reader = PdfReader::from_bytes(&written).expect("reload");
        assert_eq!(reader.page_count(), 2);
        assert_eq!(reader.page_geometry(0).expect("geometry").rotation.degrees(), 90);
    }

    #[tokio::test]
    async fn merge_with_only_unsupported_input_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "hello").expect("write");

        let result = merge(AssemblyConfig::default(), options(vec![notes], dir.path())).await;
        assert!(matches!(result, Err(PagewerkError::NothingToImport)));
    }

    #[tokio::test]
    async fn plan_resolves_files_next_to_the_plan() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("one.png"), png(10, 10)).expect("write");
        std::fs::write(dir.path().join("two.png"), png(20, 20)).expect("write");
        let plan_path = dir.path().join("plan.json");
        std::fs::write(
            &plan_path,
            r#"{
                "imports": [
                    { "files": ["one.png"] },
                    { "files": ["two.png"], "mode": "prepend" }
                ],
                "output": { "name": "planned" }
            }"#,
        )
        .expect("write plan");

        plan(AssemblyConfig::default(), &plan_path, None).await.expect("plan");

        let written = std::fs::read(dir.path().join("planned.pdf")).expect("output");
        let reader = PdfReader::from_bytes(&written).expect("reload");
        let first = reader.page_geometry(0).expect("geometry");
        assert!((first.width_pt - 20.0).abs() < 1.0);
    }

    #[test]
    fn describe_reports_pages_and_images() {
        let pdf = image_pdf("scan.pdf", 72, 144);
        let lines = describe(&pdf).expect("describe");
        assert_eq!(lines[1], "pages: 1");
        assert!(lines[2].contains("72 x 144 pt"));

        let image = pagewerk_core::SourceAsset::new("pic.png", "image/png", png(8, 6));
        assert_eq!(describe(&image).expect("describe")[1], "image: 8 x 6 px (one page)");
    }
}
