// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Insertion strategies: pure functions of (existing order, incoming order).
// They never look at the selection and never fail; an out-of-range
// `AfterIndex` position is clamped and logged.

use pagewerk_core::InsertionMode;
use tracing::warn;

/// Combine `existing` and `incoming` according to `mode`.
///
/// Relative order within each side is always preserved.
pub fn merge<T>(existing: Vec<T>, incoming: Vec<T>, mode: InsertionMode) -> Vec<T> {
    match mode {
        InsertionMode::Append => {
            let mut merged = existing;
            merged.extend(incoming);
            merged
        }
        InsertionMode::Prepend => {
            let mut merged = incoming;
            merged.extend(existing);
            merged
        }
        InsertionMode::Interleave => interleave(existing, incoming),
        InsertionMode::AfterIndex(position) => {
            let at = splice_index(position, existing.len());
            let mut merged = existing;
            let tail = merged.split_off(at);
            merged.extend(incoming);
            merged.extend(tail);
            merged
        }
    }
}

/// Where an `AfterIndex(position)` block lands in a sequence of `len` items.
///
/// `position` is 1-based ("after the k-th item"), so it doubles as the splice
/// index. Values below 0 or past `len` are pulled back to the nearest bound.
pub fn splice_index(position: i64, len: usize) -> usize {
    let upper = len as i64;
    let clamped = position.clamp(0, upper);
    if clamped != position {
        warn!(requested = position, len, used = clamped, "Insertion position clamped");
    }
    clamped as usize
}

/// e0, i0, e1, i1, ... with the longer side's remainder appended as-is.
fn interleave<T>(existing: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    let mut existing = existing.into_iter();
    let mut incoming = incoming.into_iter();
    loop {
        match (existing.next(), incoming.next()) {
            (None, None) => break,
            (left, right) => {
                merged.extend(left);
                merged.extend(right);
            }
        }
    }
    merged
}
