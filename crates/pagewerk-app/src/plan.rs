// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON assembly plans.
//
// ```json
// {
//   "imports": [
//     { "files": ["scan-odd.pdf"] },
//     { "files": ["scan-even.pdf"], "range": "all", "mode": "interleave" }
//   ],
//   "operations": [
//     { "op": "select", "range": "1-2" },
//     { "op": "rotate", "degrees": 90 },
//     { "op": "move_to_edge", "edge": "end" }
//   ],
//   "output": { "name": "booklet", "title": "Booklet" }
// }
// ```
//
// Relative file paths are resolved against the plan file's directory.

use std::path::{Path, PathBuf};

use pagewerk_assembly::Workspace;
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{Edge, InsertionMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub imports: Vec<PlanImport>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub output: PlanOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanImport {
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub mode: InsertionMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOutput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One edit applied to the workspace after all imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Replace the selection with the nodes at these 1-based positions.
    Select { range: String },
    SelectAll,
    SelectNone,
    /// Rotate the selection clockwise.
    Rotate { degrees: i32 },
    MoveToEdge { edge: Edge },
    /// Delete the selection.
    Delete,
    /// Drag one node between 1-based positions.
    Move { from: usize, to: usize },
}

impl Operation {
    pub fn apply(&self, workspace: &mut Workspace) -> Result<()> {
        match self {
            Self::Select { range } => {
                let selected = workspace.select_range(range)?;
                debug!(range = %range, selected, "selection set");
            }
            Self::SelectAll => workspace.select_all(),
            Self::SelectNone => workspace.select_none(),
            Self::Rotate { degrees } => {
                let rotated = workspace.rotate_selected(*degrees)?;
                debug!(degrees, rotated, "selection rotated");
            }
            Self::MoveToEdge { edge } => workspace.move_selected_to_edge(*edge),
            Self::Delete => {
                let removed = workspace.delete_selected();
                debug!(removed, "selection deleted");
            }
            Self::Move { from, to } => {
                let moved = from
                    .checked_sub(1)
                    .zip(to.checked_sub(1))
                    .is_some_and(|(from, to)| workspace.move_node(from, to));
                if !moved {
                    warn!(from, to, len = workspace.store().len(), "move outside the sequence ignored");
                }
            }
        }
        Ok(())
    }
}

impl Plan {
    /// Read and parse a plan file.
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path).await?;
        let plan: Plan = serde_json::from_str(&data)?;
        if plan.imports.is_empty() {
            return Err(PagewerkError::NothingToImport);
        }
        Ok(plan)
    }

    /// Make every relative import path relative to `base` instead.
    pub fn resolve_paths(&mut self, base: &Path) {
        for import in &mut self.imports {
            for file in &mut import.files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "imports": [
            { "files": ["a.pdf", "/abs/b.png"] },
            { "files": ["c.pdf"], "range": "2-4", "mode": "after:1" }
        ],
        "operations": [
            { "op": "select", "range": "1,3" },
            { "op": "rotate", "degrees": -90 },
            { "op": "move_to_edge", "edge": "start" },
            { "op": "select_all" },
            { "op": "move", "from": 1, "to": 2 },
            { "op": "delete" }
        ],
        "output": { "name": "binder" }
    }"#;

    #[test]
    fn parses_the_documented_shape() {
        let plan: Plan = serde_json::from_str(SAMPLE).expect("parse");
        assert_eq!(plan.imports.len(), 2);
        assert_eq!(plan.imports[0].mode, InsertionMode::Append);
        assert_eq!(plan.imports[1].mode, InsertionMode::AfterIndex(1));
        assert_eq!(plan.imports[1].range.as_deref(), Some("2-4"));
        assert_eq!(plan.operations[1], Operation::Rotate { degrees: -90 });
        assert_eq!(plan.operations[2], Operation::MoveToEdge { edge: Edge::Start });
        assert_eq!(plan.output.name.as_deref(), Some("binder"));
        assert_eq!(plan.output.title, None);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let result: std::result::Result<Plan, _> =
            serde_json::from_str(r#"{ "imports": [], "operations": [{ "op": "shred" }] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn relative_paths_follow_the_plan_file() {
        let mut plan: Plan = serde_json::from_str(SAMPLE).expect("parse");
        plan.resolve_paths(Path::new("/work/plans"));
        assert_eq!(plan.imports[0].files[0], PathBuf::from("/work/plans/a.pdf"));
        assert_eq!(plan.imports[0].files[1], PathBuf::from("/abs/b.png"));
    }

    #[tokio::test]
    async fn plan_without_imports_is_nothing_to_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plan.json");
        std::fs::write(&path, r#"{ "imports": [] }"#).expect("write");
        assert!(matches!(Plan::load(&path).await, Err(PagewerkError::NothingToImport)));
    }

    #[test]
    fn move_with_out_of_range_positions_is_ignored() {
        let mut workspace = Workspace::new();
        Operation::Move { from: 0, to: 3 }.apply(&mut workspace).expect("apply");
        Operation::Move { from: 4, to: 1 }.apply(&mut workspace).expect("apply");
        assert!(workspace.store().is_empty());
    }
}
