//! # Geometry Model
//!
//! Plain value types shared by the layout engine and the PDF writer:
//! edge values for margins and padding, rectangular regions, page size and
//! document metadata.
//!
//! All coordinates are PDF points (1/72 inch) with the origin at the top-left
//! corner of the page and y growing downward. The PDF writer flips y when it
//! emits content streams.

use serde::{Deserialize, Serialize};

/// Fixed page geometry. Reports are always A4 portrait.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

/// Edge values (top, right, bottom, left) used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// An axis-aligned rectangle on the page.
///
/// Used both for drawn boxes and for the bounded regions the markdown
/// renderer flows text into.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Shrink by padding on every side. Never produces negative sizes.
    pub fn inset(&self, padding: &Edges) -> Rect {
        Rect {
            x: self.x + padding.left,
            y: self.y + padding.top,
            w: (self.w - padding.horizontal()).max(0.0),
            h: (self.h - padding.vertical()).max(0.0),
        }
    }
}

/// Document metadata embedded in the PDF Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}
