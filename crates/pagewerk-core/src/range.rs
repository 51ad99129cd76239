// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-range expressions such as "1-3, 5, 8-10".
//
// Parsing is forgiving: bad tokens are dropped, out-of-bounds numbers are
// clipped, reversed spans vanish. Only a result with no pages at all is an
// error, and only for callers that need at least one page.

use std::collections::BTreeSet;

use crate::error::{PagewerkError, Result};

/// Parse `expression` into sorted, unique 1-based page numbers within
/// `[1, max]`.
///
/// An empty expression or `all` (any case) selects every page.
pub fn parse(expression: &str, max: u32) -> Vec<u32> {
    if max == 0 {
        return Vec::new();
    }

    let trimmed = expression.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return (1..=max).collect();
    }

    let mut pages = BTreeSet::new();
    for token in trimmed.split(',') {
        let Some((start, end)) = parse_token(token) else {
            continue;
        };
        if start > end {
            continue;
        }
        let low = start.max(1);
        let high = end.min(i64::from(max));
        for page in low..=high {
            pages.insert(page as u32);
        }
    }

    pages.into_iter().collect()
}

/// Like [`parse`], but an empty selection is an [`PagewerkError::EmptyRange`].
pub fn parse_required(expression: &str, max: u32) -> Result<Vec<u32>> {
    let pages = parse(expression, max);
    if pages.is_empty() {
        return Err(PagewerkError::EmptyRange(expression.trim().to_string()));
    }
    Ok(pages)
}

/// A token is `n` or `start-end`. Returns `None` for anything else.
fn parse_token(token: &str) -> Option<(i64, i64)> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    // A leading '-' belongs to a negative number, not a span separator.
    let split_at = token
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(idx, _)| idx);

    match split_at {
        Some(idx) => {
            let start = token[..idx].trim().parse::<i64>().ok()?;
            let end = token[idx + 1..].trim().parse::<i64>().ok()?;
            Some((start, end))
        }
        None => {
            let single = token.parse::<i64>().ok()?;
            Some((single, single))
        }
    }
}
