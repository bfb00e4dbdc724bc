//! # Style System
//!
//! Text and paint attributes for everything the layout engine draws, plus
//! the scoped style stack the markdown renderer uses to apply and undo
//! nested formatting.
//!
//! `Style` is a plain value. Changing the active style means storing a new
//! value; a copy that was pushed earlier is never affected. Every draw
//! primitive reads the active style at call time, so there is no separate
//! "current font" state to keep in sync.

use crate::model::Edges;
use serde::{Deserialize, Serialize};

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Brand accent used for strong text.
pub const ACCENT: Color = Color {
    r: 1.0,
    g: 113.0 / 255.0,
    b: 0.0,
    a: 1.0,
};

/// Darker accent, readable on white. Used for rules and strong text.
pub const ACCENT_DARK: Color = Color {
    r: 196.0 / 255.0,
    g: 128.0 / 255.0,
    b: 0.0,
    a: 1.0,
};

/// Leader lines, table borders.
pub const RULE_GRAY: Color = Color {
    r: 196.0 / 255.0,
    g: 196.0 / 255.0,
    b: 196.0 / 255.0,
    a: 1.0,
};

/// Alternating table row shade.
pub const ROW_SHADE: Color = Color {
    r: 0.95,
    g: 0.95,
    b: 0.95,
    a: 1.0,
};

pub const HEADER_SHADE: Color = Color {
    r: 0.88,
    g: 0.88,
    b: 0.88,
    a: 1.0,
};

/// Body text family used by the markdown renderer.
pub const BODY_FAMILY: &str = "Times";
/// Family for headings, tables and page furniture.
pub const SANS_FAMILY: &str = "Helvetica";
pub const MONO_FAMILY: &str = "Courier";

/// Font families for each role in the report.
///
/// Defaults are the standard PDF fonts. Reports in scripts the standard
/// fonts cannot encode (Cyrillic) point these at registered TrueType
/// families instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontRoles {
    /// Markdown body text and headings.
    pub body: String,
    /// Section titles, tables, page furniture.
    pub sans: String,
    pub mono: String,
}

impl Default for FontRoles {
    fn default() -> Self {
        Self {
            body: BODY_FAMILY.to_string(),
            sans: SANS_FAMILY.to_string(),
            mono: MONO_FAMILY.to_string(),
        }
    }
}

/// The complete set of text/paint attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font_family: String,
    pub bold: bool,
    /// Font size in points.
    pub font_size: f64,
    pub color: Color,
    pub background: Option<Color>,
    pub padding: Edges,
    pub align: TextAlign,
    /// Minimum content height (table cells with fixed-size artwork).
    pub min_height: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: SANS_FAMILY.to_string(),
            bold: false,
            font_size: 12.0,
            color: Color::BLACK,
            background: None,
            padding: Edges::default(),
            align: TextAlign::Left,
            min_height: 0.0,
        }
    }
}

impl Style {
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            font_family: family.to_string(),
            font_size: size,
            ..Default::default()
        }
    }

    pub fn with_font(mut self, family: &str, size: f64) -> Self {
        self.font_family = family.to_string();
        self.font_size = size;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_min_height(mut self, min_height: f64) -> Self {
        self.min_height = min_height;
        self
    }

    /// Height of one line of text in this style.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_SPACING
    }
}

/// Line height as a multiple of the font size.
pub const LINE_SPACING: f64 = 1.2;

/// Scoped save/restore of the active style.
#[derive(Debug, Clone, Default)]
pub struct StyleStack {
    active: Style,
    saved: Vec<Style>,
}

impl StyleStack {
    pub fn new(active: Style) -> Self {
        Self {
            active,
            saved: Vec::new(),
        }
    }

    pub fn active(&self) -> &Style {
        &self.active
    }

    /// Replace the active style.
    pub fn set(&mut self, style: Style) {
        self.active = style;
    }

    /// Push a copy of the active style.
    pub fn save(&mut self) {
        self.saved.push(self.active.clone());
    }

    /// Pop the most recently saved style and make it active.
    ///
    /// Returns `false` (and leaves the active style untouched) when nothing
    /// was saved.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(style) => {
                self.active = style;
                true
            }
            None => {
                log::error!("No styles to restore");
                false
            }
        }
    }

    /// Number of saved entries.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_save_restore_returns_to_start() {
        let start = Style::new("Times", 11.0);
        let mut stack = StyleStack::new(start.clone());
        for i in 0..5 {
            stack.save();
            let next = stack
                .active()
                .clone()
                .with_font("Helvetica", 10.0 + i as f64)
                .with_bold(i % 2 == 0);
            stack.set(next);
        }
        for _ in 0..5 {
            assert!(stack.restore());
        }
        assert_eq!(stack.active(), &start);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn restore_on_empty_stack_is_a_noop() {
        let start = Style::new("Courier", 9.0);
        let mut stack = StyleStack::new(start.clone());
        assert!(!stack.restore());
        assert_eq!(stack.active(), &start);
    }

    #[test]
    fn saved_copy_is_not_affected_by_later_changes() {
        let mut stack = StyleStack::new(Style::default());
        stack.save();
        stack.set(stack.active().clone().with_color(ACCENT));
        stack.restore();
        assert_eq!(stack.active().color, Color::BLACK);
    }
}
