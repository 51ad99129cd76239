// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Short, plain-language status messages for every engine error.
//
// The assembly engine never crashes on bad input; it reports. These messages
// are what a status line shows.

use crate::error::PagewerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something was skipped but the rest of the work went ahead.
    Warning,
    /// The user must change their input and try again.
    ActionRequired,
    /// The input cannot be used at all.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as the status line).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether simply repeating the operation may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PagewerkError` into a `HumanError`.
pub fn humanize_error(err: &PagewerkError) -> HumanError {
    match err {
        // -- Import --
        PagewerkError::Decode { source_name, .. } => HumanError {
            message: format!("\"{source_name}\" couldn't be opened and was skipped."),
            suggestion: "The file may be damaged or not what its name says. The other files were still added.".into(),
            retriable: false,
            severity: Severity::Warning,
        },

        PagewerkError::EmptyRange(expr) => HumanError {
            message: format!("\"{expr}\" doesn't match any pages."),
            suggestion: "Enter page numbers like 1-3,5 or leave the box empty for all pages.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::RangeNotOffered => HumanError {
            message: "Page ranges only work when adding one document.".into(),
            suggestion: "Add the document on its own to pick pages from it.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::BatchTooLarge { limit, .. } => HumanError {
            message: "That's too much to add at once.".into(),
            suggestion: format!("Add at most {limit} at a time, or pick a smaller page range."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::NothingToImport => HumanError {
            message: "None of those files can be used.".into(),
            suggestion: "Choose PDF documents or JPEG, PNG, TIFF, or WebP images.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Editing --
        PagewerkError::InvalidRotation(_) => HumanError {
            message: "Pages can only be turned in quarter turns.".into(),
            suggestion: "Rotate by 90, 180, or 270 degrees.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::InvalidInsertionMode(_) => HumanError {
            message: "That insert position isn't recognised.".into(),
            suggestion: "Use append, prepend, interleave, or after:<page number>.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::InvalidEdge(_) => HumanError {
            message: "Pages can only be moved to the start or the end.".into(),
            suggestion: "Choose start or end.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Export --
        PagewerkError::ExportSourceMissing { .. } => HumanError {
            message: "A file needed for the export is no longer available.".into(),
            suggestion: "Nothing was saved. Add the file again, or delete its pages, then export again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewerkError::EmptyAssembly => HumanError {
            message: "There are no pages to export.".into(),
            suggestion: "Add at least one document or image first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Documents --
        PagewerkError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Save it as a PDF or a common image format first. (File type: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewerkError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try opening it elsewhere to check it works, or use a different file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Storage --
        PagewerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Pagewerk doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                retriable: true,
                severity: Severity::ActionRequired,
            },
        },

        PagewerkError::Serialization(_) => HumanError {
            message: "A settings or plan file couldn't be read.".into(),
            suggestion: "Check that the file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
