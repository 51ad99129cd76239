// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reading input files into source assets.

use std::path::Path;

use pagewerk_core::SourceAsset;
use pagewerk_core::error::Result;
use tracing::debug;

/// Read one file. The media type comes from the file extension.
pub async fn read_asset(path: &Path) -> Result<SourceAsset> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(path = %path.display(), bytes = bytes.len(), "input read");
    Ok(SourceAsset::from_file_name(name, bytes))
}

/// Read every file in order. The first unreadable file fails the whole call.
pub async fn read_assets(paths: &[impl AsRef<Path>]) -> Result<Vec<SourceAsset>> {
    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        assets.push(read_asset(path.as_ref()).await?);
    }
    Ok(assets)
}
