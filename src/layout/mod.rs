//! # Page-Aware Layout Engine
//!
//! Content is laid out INTO pages, never onto an infinite canvas that gets
//! sliced afterwards. A [`Document`] always knows which page is open, how
//! much room is left on it and which margins apply, so every drawing
//! decision ("does this line still fit?") is made with the real page in
//! hand.
//!
//! The document is driven imperatively: callers move the cursor, change the
//! active style and draw. Higher level building blocks live in submodules
//! and are implemented as further methods on [`Document`]:
//!
//! - [`markdown`]: flows a markdown tree through the page or a bounded box
//! - [`table`]: column resolution, row measuring and paginated tables
//! - [`sections`]: section tracking and the table of contents
//!
//! ## Pages
//!
//! A document starts with no page. The first draw (or an explicit
//! [`Document::advance_page`]) opens page 1. Advancing recomputes the
//! margins for the new page's parity, paints the running header and footer
//! unless they are suppressed, and puts the cursor one blank line below the
//! top-left printable corner.
//!
//! ## Coordinates
//!
//! Points, origin top-left, y down. The cursor `y` is the TOP of the current
//! line; text baselines are derived from it when a line is emitted.

pub mod markdown;
pub mod sections;
pub mod table;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::*;
use crate::pdf::PdfWriter;
use crate::style::*;
use crate::text::measure_width;

pub use markdown::RenderOutcome;
pub use sections::Section;
pub use table::{resolve_column_widths, CellContext, Table};

/// Baseline offset from the top of a line, as a multiple of the font size.
const BASELINE_RATIO: f64 = 0.9;

/// Horizontal distance of one indent level.
pub const INDENT_WIDTH: f64 = 20.0;

/// A single laid-out page with all its elements positioned.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    /// 1-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    /// Margins this page was laid out with.
    pub margins: Edges,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// All text lines on the page, in drawing order.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.elements.iter().flat_map(|el| match &el.draw {
            DrawCommand::Text { lines, .. } => lines.as_slice(),
            _ => &[],
        })
    }

    /// Concatenated strings of every text line.
    pub fn texts(&self) -> Vec<&str> {
        self.text_lines().map(|l| l.text.as_str()).collect()
    }

    /// First text line whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&TextLine> {
        self.text_lines().find(|l| l.text == text)
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    /// Absolute position on the page (top-left corner).
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The visual properties to draw.
    pub draw: DrawCommand,
}

/// What to actually draw for this element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A filled and/or stroked rectangle covering the element box.
    Rect {
        background: Option<Color>,
        border_width: f64,
        border_color: Color,
    },
    /// A straight line. Coordinates are absolute.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
    /// Text lines in one color.
    Text { lines: Vec<TextLine>, color: Color },
    /// An image drawn into the element box, optionally clipped.
    Image {
        image_data: LoadedImage,
        clip: Option<Rect>,
    },
}

/// One line of text in a single font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    /// Baseline position.
    pub y: f64,
    pub width: f64,
    pub text: String,
    pub font_family: String,
    pub bold: bool,
    pub font_size: f64,
}

/// Drawing position. `indent` is the markdown list nesting level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub indent: usize,
}

/// Page size and base margins.
///
/// Margins alternate with page parity for facing-page printing: odd pages
/// put the inner margin on the left and the wide outer margin on the right,
/// even pages mirror that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub inner: f64,
    pub outer: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            inner: 40.0,
            outer: 60.0,
            top: 60.0,
            bottom: 60.0,
        }
    }
}

impl PageGeometry {
    pub fn margins_for(&self, page_number: usize) -> Edges {
        let (left, right) = if page_number % 2 == 1 {
            (self.inner, self.outer)
        } else {
            (self.outer, self.inner)
        };
        Edges {
            top: self.top,
            right,
            bottom: self.bottom,
            left,
        }
    }
}

/// The report being built.
pub struct Document {
    geometry: PageGeometry,
    fonts: FontContext,
    roles: FontRoles,
    metadata: Metadata,
    pages: Vec<LayoutPage>,
    margins: Edges,
    styles: StyleStack,
    cursor: Cursor,
    print_header: bool,
    generated_at: DateTime<Utc>,
    footer_text: Option<String>,
    sections: sections::SectionTracker,
    /// Measuring pass: geometry moves, nothing is recorded.
    dry_run: bool,
}

impl Document {
    pub fn new(fonts: FontContext) -> Self {
        Self::with_geometry(fonts, PageGeometry::default())
    }

    pub fn with_geometry(fonts: FontContext, geometry: PageGeometry) -> Self {
        let roles = FontRoles::default();
        let base = Style::new(&roles.sans, 12.0);
        Self {
            geometry,
            fonts,
            roles,
            metadata: Metadata::default(),
            pages: Vec::new(),
            margins: geometry.margins_for(1),
            styles: StyleStack::new(base),
            cursor: Cursor::default(),
            print_header: true,
            generated_at: Utc::now(),
            footer_text: None,
            sections: sections::SectionTracker::default(),
            dry_run: false,
        }
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Font families used for body text, headings and code.
    pub fn set_font_roles(&mut self, roles: FontRoles) {
        let mut base = self.styles.active().clone();
        base.font_family = roles.sans.clone();
        self.styles.set(base);
        self.roles = roles;
    }

    pub fn font_roles(&self) -> &FontRoles {
        &self.roles
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Timestamp printed in the footer.
    pub fn set_generated_at(&mut self, at: DateTime<Utc>) {
        self.generated_at = at;
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Replace the default footer ("<timestamp>") with a custom line.
    pub fn set_footer_text(&mut self, text: impl Into<String>) {
        self.footer_text = Some(text.into());
    }

    /// Toggle running header and footer for pages opened from now on.
    pub fn set_print_header(&mut self, on: bool) {
        self.print_header = on;
    }

    pub fn print_header(&self) -> bool {
        self.print_header
    }

    // ── Pages ───────────────────────────────────────────────────────

    /// Number of the open page, 0 before the first page is opened.
    pub fn page_number(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[LayoutPage] {
        &self.pages
    }

    /// Open the next page.
    pub fn advance_page(&mut self) {
        let number = self.pages.len() + 1;
        self.margins = self.geometry.margins_for(number);
        self.pages.push(LayoutPage {
            number,
            width: self.geometry.width,
            height: self.geometry.height,
            margins: self.margins,
            elements: Vec::new(),
        });
        log::debug!("Opened page {}", number);

        if self.print_header {
            self.paint_page_furniture(number);
        }

        self.cursor.x = self.indent_left();
        self.cursor.y = self.margins.top;
        self.new_line();
    }

    /// Open the next page without header or footer.
    pub fn add_plain_page(&mut self) {
        let print_header = self.print_header;
        self.print_header = false;
        self.advance_page();
        self.print_header = print_header;
    }

    fn ensure_page(&mut self) {
        if self.pages.is_empty() {
            self.advance_page();
        }
    }

    /// Page number at the outer margin on top, timestamp centered at the
    /// bottom. Drawn outside the printable area.
    fn paint_page_furniture(&mut self, number: usize) {
        let style = Style::new(&self.roles.sans, 9.0).with_color(Color::rgb(0.35, 0.35, 0.35));
        let header_y = self.margins.top / 2.0 - style.line_height() / 2.0;
        let footer_y = self.geometry.height - self.margins.bottom / 2.0 - style.line_height() / 2.0;

        let number_text = number.to_string();
        let align = if number % 2 == 1 {
            TextAlign::Right
        } else {
            TextAlign::Left
        };
        let (left, width) = (self.content_left(), self.printable_width());
        self.draw_text_in_box(&number_text, left, header_y, width, align, &style);

        let footer = self
            .footer_text
            .clone()
            .unwrap_or_else(|| self.generated_at.format("%d %b %y %H:%M UTC").to_string());
        let page_width = self.geometry.width;
        self.draw_text_in_box(&footer, 0.0, footer_y, page_width, TextAlign::Center, &style);
    }

    // ── Geometry ────────────────────────────────────────────────────

    pub fn margins(&self) -> Edges {
        self.margins
    }

    pub fn printable_width(&self) -> f64 {
        self.geometry.width - self.margins.horizontal()
    }

    pub fn printable_height(&self) -> f64 {
        self.geometry.height - self.margins.vertical()
    }

    pub fn content_left(&self) -> f64 {
        self.margins.left
    }

    pub fn content_right(&self) -> f64 {
        self.geometry.width - self.margins.right
    }

    pub fn content_top(&self) -> f64 {
        self.margins.top
    }

    pub fn content_bottom(&self) -> f64 {
        self.geometry.height - self.margins.bottom
    }

    /// Remaining printable area below the cursor.
    pub fn remaining_area(&self) -> Rect {
        let top = self.cursor.y.max(self.content_top());
        Rect::new(
            self.content_left(),
            top,
            self.printable_width(),
            (self.content_bottom() - top).max(0.0),
        )
    }

    // ── Cursor ──────────────────────────────────────────────────────

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn x(&self) -> f64 {
        self.cursor.x
    }

    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.cursor.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.cursor.y = y;
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.cursor.x = x;
        self.cursor.y = y;
    }

    pub fn indent(&self) -> usize {
        self.cursor.indent
    }

    pub(crate) fn set_indent(&mut self, indent: usize) {
        self.cursor.indent = indent;
    }

    fn indent_left(&self) -> f64 {
        self.content_left() + self.cursor.indent as f64 * INDENT_WIDTH
    }

    /// Move to the start of the next line of the active style.
    pub fn new_line(&mut self) {
        self.cursor.y += self.styles.active().line_height();
        self.cursor.x = self.indent_left();
    }

    pub fn new_lines(&mut self, n: usize) {
        for _ in 0..n {
            self.new_line();
        }
    }

    /// Advance the page when fewer than `height` points are left below the
    /// cursor. Returns whether a new page was opened.
    pub fn ensure_vertical_space(&mut self, height: f64) -> bool {
        if self.pages.is_empty() {
            self.advance_page();
            return true;
        }
        if self.cursor.y + height > self.content_bottom() {
            self.advance_page();
            return true;
        }
        false
    }

    // ── Styles ──────────────────────────────────────────────────────

    pub fn style(&self) -> &Style {
        self.styles.active()
    }

    pub fn set_style(&mut self, style: Style) {
        self.styles.set(style);
    }

    pub fn save_style(&mut self) {
        self.styles.save();
    }

    pub fn restore_style(&mut self) -> bool {
        self.styles.restore()
    }

    pub fn style_depth(&self) -> usize {
        self.styles.depth()
    }

    /// Replace the active style with an edited copy of itself.
    pub fn update_style(&mut self, edit: impl FnOnce(Style) -> Style) {
        let next = edit(self.styles.active().clone());
        self.styles.set(next);
    }

    // ── Drawing ─────────────────────────────────────────────────────

    fn push(&mut self, element: LayoutElement) {
        if self.dry_run {
            return;
        }
        self.ensure_page();
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    pub(crate) fn measure(&self, text: &str, style: &Style) -> f64 {
        measure_width(&self.fonts, text, style)
    }

    /// Emit one line of text with its top at `y`. Returns its width.
    pub(crate) fn draw_text_line(&mut self, text: &str, x: f64, y: f64, style: &Style) -> f64 {
        let width = self.measure(text, style);
        if text.is_empty() {
            return width;
        }
        self.push(LayoutElement {
            x,
            y,
            width,
            height: style.line_height(),
            draw: DrawCommand::Text {
                lines: vec![TextLine {
                    x,
                    y: y + style.font_size * BASELINE_RATIO,
                    width,
                    text: text.to_string(),
                    font_family: style.font_family.clone(),
                    bold: style.bold,
                    font_size: style.font_size,
                }],
                color: style.color,
            },
        });
        width
    }

    fn draw_text_in_box(&mut self, text: &str, x: f64, y: f64, w: f64, align: TextAlign, style: &Style) -> f64 {
        let width = self.measure(text, style);
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x + (w - width) / 2.0,
            TextAlign::Right => x + w - width,
        };
        self.draw_text_line(text, left, y, style);
        left
    }

    /// Draw `text` at the cursor in the active style and move the cursor
    /// past it.
    pub fn text(&mut self, text: &str) {
        self.ensure_page();
        let style = self.styles.active().clone();
        let (x, y) = (self.cursor.x, self.cursor.y);
        let width = self.draw_text_line(text, x, y, &style);
        self.cursor.x += width;
    }

    pub fn text_at(&mut self, text: &str, x: f64, y: f64) {
        self.set_xy(x, y);
        self.text(text);
    }

    /// Single line aligned inside a box `w` wide. The cursor does not move.
    /// Returns the x where the text starts.
    pub fn text_aligned(&mut self, text: &str, x: f64, y: f64, w: f64, align: TextAlign) -> f64 {
        self.ensure_page();
        let style = self.styles.active().clone();
        self.draw_text_in_box(text, x, y, w, align, &style)
    }

    /// Single line centered on `center_x`. Leaves the cursor after the text.
    pub fn text_centered(&mut self, text: &str, center_x: f64, y: f64) {
        let width = self.measure(text, self.styles.active());
        self.text_at(text, center_x - width / 2.0, y);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(LayoutElement {
            x: rect.x,
            y: rect.y,
            width: rect.w,
            height: rect.h,
            draw: DrawCommand::Rect {
                background: Some(color),
                border_width: 0.0,
                border_color: Color::BLACK,
            },
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.push(LayoutElement {
            x: rect.x,
            y: rect.y,
            width: rect.w,
            height: rect.h,
            draw: DrawCommand::Rect {
                background: None,
                border_width: width,
                border_color: color,
            },
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color, width: f64) {
        self.push(LayoutElement {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
            draw: DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            },
        });
    }

    /// Draw an image stretched into `rect`.
    pub fn image(&mut self, image: &LoadedImage, rect: Rect) {
        self.push(LayoutElement {
            x: rect.x,
            y: rect.y,
            width: rect.w,
            height: rect.h,
            draw: DrawCommand::Image {
                image_data: image.clone(),
                clip: None,
            },
        });
    }

    /// Draw an image scaled to cover `rect` completely, keeping its aspect
    /// ratio. The overflow is clipped.
    pub fn image_cover(&mut self, image: &LoadedImage, rect: Rect) {
        if image.width_px == 0 || image.height_px == 0 || rect.h <= 0.0 {
            return;
        }
        let aspect = image.aspect();
        let (w, h) = if rect.w / rect.h > aspect {
            (rect.w, rect.w / aspect)
        } else {
            (rect.h * aspect, rect.h)
        };
        self.push(LayoutElement {
            x: rect.x + (rect.w - w) / 2.0,
            y: rect.y + (rect.h - h) / 2.0,
            width: w,
            height: h,
            draw: DrawCommand::Image {
                image_data: image.clone(),
                clip: Some(rect),
            },
        });
    }

    // ── Output ──────────────────────────────────────────────────────

    /// Serialize every page to PDF bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.ensure_page();
        log::info!("Writing PDF with {} page(s)", self.pages.len());
        PdfWriter::new().write(&self.pages, &self.metadata, &self.fonts)
    }

    pub fn write_to(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
