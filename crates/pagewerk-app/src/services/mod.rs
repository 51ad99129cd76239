// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: bridges the command line to the pagewerk engine crates.
//
// File and config I/O is async (tokio); the assembly pipeline itself is
// synchronous and runs on a blocking thread.

pub mod config_dir;
pub mod pipeline;
pub mod sources;
