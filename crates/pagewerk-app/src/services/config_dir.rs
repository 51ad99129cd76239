// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Config file location and loading.

use std::path::{Path, PathBuf};

use pagewerk_core::AssemblyConfig;
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "config.json";

/// Default config file: `$XDG_CONFIG_HOME/pagewerk/config.json`, falling back
/// to `~/.config/pagewerk/config.json`. `None` when neither variable is set.
pub fn default_config_path() -> Option<PathBuf> {
    config_base().map(|base| base.join("pagewerk").join(CONFIG_FILE))
}

fn config_base() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    std::env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(|home| PathBuf::from(home).join(".config"))
}

/// Load the config from `explicit`, or from the default location.
///
/// A missing or unreadable file is not fatal: the defaults are used and the
/// problem is logged.
pub async fn load_config(explicit: Option<&Path>) -> AssemblyConfig {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(default_config_path) else {
        debug!("no config location available, using defaults");
        return AssemblyConfig::default();
    };

    let data = match tokio::fs::read_to_string(&path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            debug!(path = %path.display(), "no config file, using defaults");
            return AssemblyConfig::default();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config unreadable, using defaults");
            return AssemblyConfig::default();
        }
    };

    match serde_json::from_str(&data) {
        Ok(config) => {
            info!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config malformed, using defaults");
            AssemblyConfig::default()
        }
    }
}
