// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewerk: Core types, errors, configuration, and page-range parsing shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod range;
pub mod types;

pub use config::AssemblyConfig;
pub use error::{PagewerkError, Result};
pub use types::*;
