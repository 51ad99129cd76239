// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: reading and page copying, image pages, and output assembly.

pub mod assembler;
pub mod reader;
pub mod writer;

pub use assembler::PdfAssembler;
pub use reader::PdfReader;
pub use writer::PdfWriter;
