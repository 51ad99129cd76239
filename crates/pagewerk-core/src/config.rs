// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for import, preview rendering, and export.
///
/// Missing keys in a config file fall back to the defaults, so a file only
/// needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Preview raster size relative to the page's native size (1.0 = one
    /// pixel per PDF point or per image pixel).
    pub preview_scale: f32,
    /// Output name used when the caller supplies none (extension appended).
    pub default_output_name: String,
    /// Maximum number of source files in one import batch.
    pub max_import_sources: usize,
    /// Maximum number of pages a single import may place.
    pub max_import_pages: usize,
    /// PDF header version of exported documents.
    pub pdf_version: String,
    /// Compress content streams of the exported document.
    pub compress_output: bool,
    /// `/Producer` entry written into exported documents.
    pub producer: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            preview_scale: 0.25,
            default_output_name: "assembled".into(),
            max_import_sources: 64,
            max_import_pages: 1000,
            pdf_version: "1.5".into(),
            compress_output: true,
            producer: "Pagewerk".into(),
        }
    }
}

impl AssemblyConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// The preview scale clamped to something that still yields a visible
    /// raster and cannot explode memory.
    pub fn effective_preview_scale(&self) -> f32 {
        if self.preview_scale.is_finite() {
            self.preview_scale.clamp(0.01, 4.0)
        } else {
            Self::default().preview_scale
        }
    }
}
