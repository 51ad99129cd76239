// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly export: walk the node order top to bottom and write one PDF.
//
// Document pages are copied from their source objects, never from previews.
// Every node's source is resolved before the first page is written, so a
// missing source aborts the export with nothing produced.

use std::path::{Path, PathBuf};

use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{AssemblyConfig, Node, NodeKind};
use pagewerk_document::{DecodedContent, DocumentInfo, PdfAssembler};
use tracing::{debug, info, instrument};

use crate::library::SourceLibrary;
use crate::store::NodeStore;
use crate::workspace::Workspace;

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Writes a workspace out as a PDF.
#[derive(Debug, Clone)]
pub struct AssemblyExporter {
    pdf_version: String,
    compress: bool,
    default_name: String,
    info: DocumentInfo,
}

impl AssemblyExporter {
    pub fn new(config: &AssemblyConfig) -> Self {
        Self {
            pdf_version: config.pdf_version.clone(),
            compress: config.compress_output,
            default_name: config.default_output_name.clone(),
            info: DocumentInfo {
                title: None,
                producer: config.producer.clone(),
            },
        }
    }

    /// Title written into the document's /Info.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    /// Export the workspace's current order under `name` (or the configured
    /// default name).
    pub fn export(&self, workspace: &Workspace, name: Option<&str>) -> Result<ExportedDocument> {
        self.export_nodes(workspace.store(), workspace.library(), name)
    }

    #[instrument(skip_all, fields(nodes = store.len()))]
    pub fn export_nodes(
        &self,
        store: &NodeStore,
        library: &SourceLibrary,
        name: Option<&str>,
    ) -> Result<ExportedDocument> {
        if store.is_empty() {
            return Err(PagewerkError::EmptyAssembly);
        }

        let resolved = store
            .nodes()
            .iter()
            .map(|node| {
                library
                    .get(node.source)
                    .map(|entry| (node, &entry.content))
                    .ok_or(PagewerkError::ExportSourceMissing {
                        source_id: node.source,
                        node_id: node.id(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut assembler = PdfAssembler::new(&self.pdf_version);
        for (position, (node, content)) in resolved.into_iter().enumerate() {
            append_node(&mut assembler, node, content)?;
            debug!(position = position + 1, node = %node.id(), rotation = %node.rotation, "Node written");
        }

        let page_count = assembler.page_count();
        let bytes = assembler.finish(&self.info, self.compress)?;
        let file_name = output_file_name(name, &self.default_name);

        info!(%file_name, page_count, bytes = bytes.len(), "Assembly exported");
        Ok(ExportedDocument {
            file_name,
            bytes,
            page_count,
        })
    }

    /// Export and write the file into `dir`. Returns the written path.
    pub fn export_to_dir(&self, workspace: &Workspace, name: Option<&str>, dir: &Path) -> Result<PathBuf> {
        let exported = self.export(workspace, name)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&exported.file_name);
        std::fs::write(&path, &exported.bytes)?;
        info!(path = %path.display(), "Assembly saved");
        Ok(path)
    }
}

fn append_node(assembler: &mut PdfAssembler, node: &Node, content: &DecodedContent) -> Result<()> {
    match (node.kind, content) {
        (NodeKind::Page, DecodedContent::Document(reader)) => {
            assembler.append_page(node.source, reader, node.original_index, node.rotation)
        }
        (NodeKind::Image, DecodedContent::Image { bytes, .. }) => assembler.append_image(bytes, node.rotation),
        (kind, other) => Err(PagewerkError::PdfError(format!(
            "node {} is a {:?} but its source is {:?}",
            node.id(),
            kind,
            other.media_kind()
        ))),
    }
}

/// `name` trimmed (or `default` when blank), path separators replaced, with
/// `.pdf` appended unless it already ends that way in any case.
pub fn output_file_name(name: Option<&str>, default: &str) -> String {
    let base = name.map(str::trim).filter(|name| !name.is_empty()).unwrap_or(default);
    let base: String = base
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if base.to_ascii_lowercase().ends_with(".pdf") {
        base
    } else {
        format!("{base}.pdf")
    }
}
