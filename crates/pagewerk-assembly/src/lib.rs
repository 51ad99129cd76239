// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-assembly: the assembly engine. Holds the ordered node store and
// its selection, coordinates imports from source assets into it, and exports
// the final order as a PDF. Decoding and PDF plumbing live in
// `pagewerk-document`.

pub mod export;
pub mod import;
pub mod insertion;
pub mod library;
pub mod selection;
pub mod store;
pub mod workspace;

#[cfg(test)]
pub(crate) mod fixtures;

pub use export::{AssemblyExporter, ExportedDocument, output_file_name};
pub use import::{DecodeFailure, ImportBatch, ImportProgress, PendingImport, SkippedAsset};
pub use library::{SourceEntry, SourceLibrary};
pub use selection::Selection;
pub use store::NodeStore;
pub use workspace::{ImportOutcome, Workspace};
