// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewerk.

use thiserror::Error;

use crate::types::{NodeId, SourceId};

/// Top-level error type for all Pagewerk operations.
#[derive(Debug, Error)]
pub enum PagewerkError {
    // -- Import errors --
    #[error("cannot decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("page range \"{0}\" selects no pages")]
    EmptyRange(String),

    #[error("a page range can only be chosen when a single document is imported")]
    RangeNotOffered,

    #[error("import batch too large: {requested} exceeds the limit of {limit}")]
    BatchTooLarge { limit: usize, requested: usize },

    #[error("nothing to import: no supported files in the batch")]
    NothingToImport,

    // -- Editing errors --
    #[error("rotation must be a multiple of 90, got {0}")]
    InvalidRotation(i32),

    #[error("unknown insertion mode: {0}")]
    InvalidInsertionMode(String),

    #[error("unknown edge: {0} (expected start or end)")]
    InvalidEdge(String),

    // -- Export errors --
    #[error("source {source_id} for node {node_id} is no longer available")]
    ExportSourceMissing { source_id: SourceId, node_id: NodeId },

    #[error("the assembly is empty")]
    EmptyAssembly,

    // -- Document errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagewerkError>;
