// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagewerk assembly engine.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PagewerkError, Result};

/// Unique identifier for a placed node. Stable for the node's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a source asset. Many nodes may share one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    Tiff,
    Webp,
}

impl DocumentType {
    /// Canonical MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Classify a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" | "application/x-pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/tiff" => Some(Self::Tiff),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Pdf => MediaKind::PaginatedDocument,
            Self::Jpeg | Self::Png | Self::Tiff | Self::Webp => MediaKind::Image,
        }
    }
}

/// Broad classification of an incoming asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    PaginatedDocument,
    Image,
    Unsupported,
}

/// A raw source blob as supplied by the caller.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    /// Display name (usually the file name).
    pub name: String,
    /// Declared MIME type.
    pub media_type: String,
    /// Encoded bytes, shared so staging and decoding never copy them.
    pub bytes: Arc<[u8]>,
}

impl SourceAsset {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Build an asset whose media type is inferred from the name's extension.
    /// Unknown extensions get `application/octet-stream` and classify as
    /// unsupported.
    pub fn from_file_name(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let media_type = name
            .rsplit_once('.')
            .and_then(|(_, ext)| DocumentType::from_extension(ext))
            .map(|doc_type| doc_type.mime_type())
            .unwrap_or("application/octet-stream");
        Self::new(name, media_type, bytes)
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        DocumentType::from_mime_type(&self.media_type)
    }

    pub fn media_kind(&self) -> MediaKind {
        self.document_type()
            .map(|doc_type| doc_type.media_kind())
            .unwrap_or(MediaKind::Unsupported)
    }
}

/// What a node was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// One page of a paginated source.
    Page,
    /// A whole standalone image.
    Image,
}

/// Clockwise quarter-turn rotation, always normalised to 0, 90, 180 or 270.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rotation(u16);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// Normalise any multiple of 90 (negative included) into a rotation.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(PagewerkError::InvalidRotation(degrees));
        }
        Ok(Self(degrees.rem_euclid(360) as u16))
    }

    pub fn degrees(&self) -> u16 {
        self.0
    }

    /// `(self + delta) mod 360`.
    pub fn rotated_by(self, delta: i32) -> Result<Self> {
        let delta = Self::from_degrees(delta)?;
        Ok(Self((self.0 + delta.0) % 360))
    }

    /// True for 90 and 270, where width and height trade places.
    pub fn swaps_axes(&self) -> bool {
        self.0 == 90 || self.0 == 270
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Display-only raster of a node, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub png: Arc<[u8]>,
}

/// One placed page or image in the assembly sequence.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub source: SourceId,
    pub kind: NodeKind,
    /// Zero-based page index in the source; always 0 for images.
    pub original_index: u32,
    pub preview: Preview,
    pub rotation: Rotation,
}

impl Node {
    pub fn page(source: SourceId, original_index: u32, preview: Preview) -> Self {
        Self {
            id: NodeId::new(),
            source,
            kind: NodeKind::Page,
            original_index,
            preview,
            rotation: Rotation::NONE,
        }
    }

    pub fn image(source: SourceId, preview: Preview) -> Self {
        Self {
            id: NodeId::new(),
            source,
            kind: NodeKind::Image,
            original_index: 0,
            preview,
            rotation: Rotation::NONE,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// Which end of the sequence a batch move targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Start,
    End,
}

impl FromStr for Edge {
    type Err = PagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "top" | "front" => Ok(Self::Start),
            "end" | "bottom" | "back" => Ok(Self::End),
            other => Err(PagewerkError::InvalidEdge(other.to_string())),
        }
    }
}

/// Rule used to splice newly imported nodes into the existing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InsertionMode {
    #[default]
    Append,
    Prepend,
    Interleave,
    /// Splice after the given 1-based position. Clamped when applied, so the
    /// stored value may be negative or past the end.
    AfterIndex(i64),
}

impl FromStr for InsertionMode {
    type Err = PagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "append" => return Ok(Self::Append),
            "prepend" => return Ok(Self::Prepend),
            "interleave" => return Ok(Self::Interleave),
            _ => {}
        }

        let position = lower
            .strip_prefix("after-index:")
            .or_else(|| lower.strip_prefix("after:"))
            .ok_or_else(|| PagewerkError::InvalidInsertionMode(s.to_string()))?;

        parse_position(position)
            .map(Self::AfterIndex)
            .ok_or_else(|| PagewerkError::InvalidInsertionMode(s.to_string()))
    }
}

/// User-entered target positions may be decimal; they are floored. Anything
/// non-finite is rejected.
fn parse_position(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(whole) = raw.parse::<i64>() {
        return Some(whole);
    }
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

impl fmt::Display for InsertionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => f.write_str("append"),
            Self::Prepend => f.write_str("prepend"),
            Self::Interleave => f.write_str("interleave"),
            Self::AfterIndex(k) => write!(f, "after:{k}"),
        }
    }
}

impl TryFrom<String> for InsertionMode {
    type Error = PagewerkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<InsertionMode> for String {
    fn from(mode: InsertionMode) -> Self {
        mode.to_string()
    }
}
