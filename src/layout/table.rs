//! # Tables
//!
//! A [`Table`] collects a header and rows of text cells; the document lays
//! it out with [`Document::write_table`].
//!
//! Everything is measured before anything is drawn: column widths are
//! resolved against the printable width, then every row height is computed
//! from the same wrapping the painter uses. Pagination then only has to
//! compare heights. When a row does not fit, the part of the table painted
//! so far gets its border, the page is advanced and the header is painted
//! again before the row.
//!
//! A cell whose text starts with [`MD_MARKER`] is rendered as markdown,
//! bounded to the cell. Its height comes from a dry-run render.

use super::Document;
use crate::image_loader::ImageProvider;
use crate::markdown::{self, MdNode};
use crate::model::{Edges, Rect};
use crate::style::*;
use crate::text::{estimate_height, wrap_text};

/// Prefix marking a cell as markdown. Stripped before rendering.
pub const MD_MARKER: &str = "!MD";

/// What a pre-draw hook gets to see about the cell being painted.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    /// Data row index. Header cells do not go through the hook.
    pub row: usize,
    pub column: usize,
    /// Full cell box, padding included.
    pub rect: Rect,
    pub text: &'a str,
    pub style: &'a Style,
}

/// Called before the content of every data cell is painted.
pub type CellHook = Box<dyn Fn(&mut Document, &CellContext<'_>) + Send + Sync>;

pub struct Table {
    columns: usize,
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    /// 0 = auto.
    widths: Vec<f64>,
    base_style: Style,
    column_styles: Vec<Style>,
    header_style: Style,
    border_color: Color,
    before_draw_cell: Option<CellHook>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("header", &self.header)
            .field("rows", &self.rows.len())
            .field("widths", &self.widths)
            .field("hook", &self.before_draw_cell.is_some())
            .finish()
    }
}

impl Table {
    pub fn new() -> Self {
        let base_style = Style::new(SANS_FAMILY, 10.0).with_padding(Edges::symmetric(4.0, 5.0));
        let header_style = base_style
            .clone()
            .with_bold(true)
            .with_align(TextAlign::Center)
            .with_background(Some(HEADER_SHADE));
        Self {
            columns: 0,
            header: None,
            rows: Vec::new(),
            widths: Vec::new(),
            base_style,
            column_styles: Vec::new(),
            header_style,
            border_color: RULE_GRAY,
            before_draw_cell: None,
        }
    }

    /// Use `family` for the header and every column.
    pub fn with_font_family(mut self, family: &str) -> Self {
        self.base_style.font_family = family.to_string();
        self.header_style.font_family = family.to_string();
        for style in &mut self.column_styles {
            style.font_family = family.to_string();
        }
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Declare the column count. Fails once cells with another count exist.
    pub fn set_column_count(&mut self, n: usize) -> bool {
        if n == 0 {
            log::error!("A table needs at least one column");
            return false;
        }
        if n != self.columns && (self.header.is_some() || !self.rows.is_empty()) {
            log::error!(
                "Cannot change column count from {} to {} after cells were added",
                self.columns,
                n
            );
            return false;
        }
        self.columns = n;
        self.widths.resize(n, 0.0);
        self.column_styles.resize(n, self.base_style.clone());
        true
    }

    fn accept_cells(&mut self, len: usize, what: &str) -> bool {
        if self.columns == 0 {
            return self.set_column_count(len);
        }
        if len != self.columns {
            log::error!(
                "Wrong table {} width: {} cells, table has {} columns",
                what,
                len,
                self.columns
            );
            return false;
        }
        true
    }

    pub fn set_header<I, S>(&mut self, cells: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        if !self.accept_cells(cells.len(), "header") {
            return false;
        }
        self.header = Some(cells);
        true
    }

    pub fn add_row<I, S>(&mut self, cells: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        if !self.accept_cells(cells.len(), "row") {
            return false;
        }
        self.rows.push(cells);
        true
    }

    /// Fixed width in points, 0 for auto.
    pub fn set_column_width(&mut self, column: usize, width: f64) -> bool {
        if width < 0.0 {
            log::error!("Negative width {} for column {}", width, column);
            return false;
        }
        match self.widths.get_mut(column) {
            Some(w) => {
                *w = width;
                true
            }
            None => {
                log::error!("Column {} out of range ({} columns)", column, self.columns);
                false
            }
        }
    }

    pub fn column_style_mut(&mut self, column: usize) -> Option<&mut Style> {
        self.column_styles.get_mut(column)
    }

    pub fn column_style(&self, column: usize) -> Option<&Style> {
        self.column_styles.get(column)
    }

    pub fn set_header_style(&mut self, style: Style) {
        self.header_style = style;
    }

    pub fn on_before_draw_cell<F>(&mut self, hook: F)
    where
        F: Fn(&mut Document, &CellContext<'_>) + Send + Sync + 'static,
    {
        self.before_draw_cell = Some(Box::new(hook));
    }
}

/// Final column widths for a table `printable` points wide.
///
/// Auto columns (width 0) share what the fixed columns leave over.
pub fn resolve_column_widths(widths: &[f64], printable: f64) -> Vec<f64> {
    let declared: f64 = widths.iter().filter(|w| **w > 0.0).sum();
    let auto = widths.iter().filter(|w| **w <= 0.0).count();
    let leftover = (printable - declared).max(0.0);
    let auto_width = if auto > 0 { leftover / auto as f64 } else { 0.0 };
    widths
        .iter()
        .map(|&w| if w > 0.0 { w } else { auto_width })
        .collect()
}

impl Document {
    /// Lay out `table` at the cursor, continuing on new pages as needed.
    /// The cursor ends below the table at the left margin.
    pub fn write_table(&mut self, table: &Table, images: &dyn ImageProvider) {
        if table.columns == 0 || table.rows.is_empty() {
            log::error!("Table has no rows to draw");
            return;
        }
        self.ensure_page();

        let widths = resolve_column_widths(&table.widths, self.printable_width());
        let has_auto = table.widths.iter().any(|w| *w <= 0.0);
        let header_height = match &table.header {
            Some(cells) => self.cells_height(cells, &widths, |_| &table.header_style, images),
            None => 0.0,
        };
        let row_heights: Vec<f64> = table
            .rows
            .iter()
            .map(|row| self.cells_height(row, &widths, |col| &table.column_styles[col], images))
            .collect();
        log::debug!(
            "Table: {} rows, widths {:?}, header {:.1}pt",
            table.rows.len(),
            widths,
            header_height
        );

        if self.y() + header_height + row_heights[0] > self.content_bottom() {
            self.advance_page();
        }
        let mut left = self.table_left(&widths, has_auto);
        let mut top = self.y();
        let mut y = self.paint_header(table, &widths, left, top, header_height);
        let mut rows_on_page = 0;

        for (i, (row, &height)) in table.rows.iter().zip(&row_heights).enumerate() {
            if rows_on_page > 0 && y + height > self.content_bottom() {
                self.draw_table_frame(table, &widths, left, top, y, header_height);
                self.advance_page();
                left = self.table_left(&widths, has_auto);
                top = self.y();
                y = self.paint_header(table, &widths, left, top, header_height);
                rows_on_page = 0;
            }
            self.paint_row(table, i, row, &widths, left, y, height, images);
            y += height;
            rows_on_page += 1;
        }

        self.draw_table_frame(table, &widths, left, top, y, header_height);
        let content_left = self.content_left();
        self.set_xy(content_left, y);
    }

    fn table_left(&self, widths: &[f64], has_auto: bool) -> f64 {
        if has_auto {
            return self.content_left();
        }
        let total: f64 = widths.iter().sum();
        self.content_left() + ((self.printable_width() - total) / 2.0).max(0.0)
    }

    /// Tallest cell of a row, floored by each style's minimum height.
    fn cells_height<'s>(
        &mut self,
        cells: &[String],
        widths: &[f64],
        style_of: impl Fn(usize) -> &'s Style,
        images: &dyn ImageProvider,
    ) -> f64 {
        let mut height: f64 = 0.0;
        for (col, (text, &width)) in cells.iter().zip(widths).enumerate() {
            let style = style_of(col);
            let content = match markdown_cell(text) {
                Some(node) => {
                    let inner = (width - style.padding.horizontal()).max(0.0);
                    self.save_style();
                    self.set_style(style.clone());
                    let h = self.measure_markdown(&node, inner, images);
                    self.restore_style();
                    h + style.padding.vertical()
                }
                None => estimate_height(self.fonts(), text, width, style),
            };
            let floor = style.min_height + style.padding.vertical();
            height = height.max(content).max(floor);
        }
        height
    }

    fn paint_header(&mut self, table: &Table, widths: &[f64], left: f64, top: f64, height: f64) -> f64 {
        let Some(cells) = &table.header else {
            return top;
        };
        let total: f64 = widths.iter().sum();
        let style = &table.header_style;
        if let Some(bg) = style.background {
            self.fill_rect(Rect::new(left, top, total, height), bg);
        }
        let mut x = left;
        for (text, &width) in cells.iter().zip(widths) {
            self.paint_plain_cell(text, Rect::new(x, top, width, height), style);
            x += width;
        }
        top + height
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_row(
        &mut self,
        table: &Table,
        index: usize,
        row: &[String],
        widths: &[f64],
        left: f64,
        top: f64,
        height: f64,
        images: &dyn ImageProvider,
    ) {
        if index % 2 == 1 {
            let total: f64 = widths.iter().sum();
            self.fill_rect(Rect::new(left, top, total, height), ROW_SHADE);
        }
        let mut x = left;
        for (col, (text, &width)) in row.iter().zip(widths).enumerate() {
            let style = &table.column_styles[col];
            let cell = Rect::new(x, top, width, height);
            if let Some(bg) = style.background {
                self.fill_rect(cell, bg);
            }
            if let Some(hook) = &table.before_draw_cell {
                hook(
                    self,
                    &CellContext {
                        row: index,
                        column: col,
                        rect: cell,
                        text,
                        style,
                    },
                );
            }
            match markdown_cell(text) {
                Some(node) => {
                    let content = cell.inset(&style.padding);
                    // Slack for float drift between the measuring and drawing passes.
                    let bounds = Rect::new(content.x, content.y, content.w, content.h + 0.5);
                    self.save_style();
                    self.set_style(style.clone());
                    let outcome = self.render_md_node(&node, bounds, false, images);
                    self.restore_style();
                    if outcome.overflowed {
                        log::warn!("Markdown cell ({}, {}) was cut off", index, col);
                    }
                }
                None => self.paint_plain_cell(text, cell, style),
            }
            x += width;
        }
    }

    fn paint_plain_cell(&mut self, text: &str, cell: Rect, style: &Style) {
        let content = cell.inset(&style.padding);
        let lines = wrap_text(self.fonts(), text, content.w, style);
        for (k, line) in lines.iter().enumerate() {
            let top = content.y + k as f64 * style.line_height();
            self.draw_text_in_box(line, content.x, top, content.w, style.align, style);
        }
    }

    fn draw_table_frame(&mut self, table: &Table, widths: &[f64], left: f64, top: f64, bottom: f64, header_height: f64) {
        let total: f64 = widths.iter().sum();
        let color = table.border_color;
        self.stroke_rect(Rect::new(left, top, total, bottom - top), color, 0.75);
        if header_height > 0.0 {
            let y = top + header_height;
            self.line(left, y, left + total, y, color, 0.75);
        }
        let mut x = left;
        for width in &widths[..widths.len().saturating_sub(1)] {
            x += width;
            self.line(x, top, x, bottom, color, 0.75);
        }
    }
}

/// Parsed markdown for a `!MD` cell. Unparseable markdown is drawn as
/// plain text.
fn markdown_cell(text: &str) -> Option<MdNode> {
    let src = text.strip_prefix(MD_MARKER)?;
    match markdown::parse(src) {
        Ok(node) => Some(node),
        Err(e) => {
            log::error!("Markdown cell falls back to plain text: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::image_loader::NoImages;
    use crate::layout::{DrawCommand, LayoutPage};
    use std::sync::{Arc, Mutex};

    fn doc() -> Document {
        let mut d = Document::new(FontContext::new());
        d.set_print_header(false);
        d.advance_page();
        d
    }

    #[test]
    fn leftover_width_goes_to_auto_columns() {
        let w = resolve_column_widths(&[0.0, 100.0, 100.0], 500.0);
        assert_eq!(w, vec![300.0, 100.0, 100.0]);

        let w = resolve_column_widths(&[0.0, 50.0, 0.0], 450.0);
        assert_eq!(w, vec![200.0, 50.0, 200.0]);

        let w = resolve_column_widths(&[0.0, 400.0], 300.0);
        assert_eq!(w, vec![0.0, 400.0]);
    }

    #[test]
    fn first_cells_fix_the_column_count() {
        let mut t = Table::new();
        assert!(t.add_row(["a", "b", "c"]));
        assert_eq!(t.columns(), 3);
        assert!(!t.add_row(["a", "b"]));
        assert!(!t.set_header(["x", "y", "z", "w"]));
        assert!(t.set_header(["x", "y", "z"]));
        assert_eq!(t.rows().len(), 1);
        assert!(!t.set_column_count(2));
        assert!(!t.set_column_width(5, 10.0));
    }

    #[test]
    fn declared_count_rejects_mismatched_header() {
        let mut t = Table::new();
        assert!(t.set_column_count(2));
        assert!(!t.set_header(["only one"]));
        assert!(t.header().is_none());
    }

    #[test]
    fn empty_table_draws_nothing() {
        let mut d = doc();
        let t = Table::new();
        d.write_table(&t, &NoImages);
        assert!(d.pages()[0].elements.is_empty());
    }

    fn header_lines(page: &LayoutPage) -> Vec<(String, bool, f64)> {
        page.text_lines()
            .filter(|l| l.text.starts_with("Head"))
            .map(|l| (l.text.clone(), l.bold, l.font_size))
            .collect()
    }

    #[test]
    fn header_repeats_on_every_page() {
        let mut d = doc();
        let mut t = Table::new();
        t.set_header(["Head A", "Head B"]);
        for i in 0..120 {
            t.add_row([format!("row {}", i), "value".to_string()]);
        }
        d.write_table(&t, &NoImages);

        assert!(d.page_number() >= 2);
        let first = header_lines(&d.pages()[0]);
        assert_eq!(first.len(), 2);
        for page in d.pages() {
            assert_eq!(header_lines(page), first);
            let bottom = page.height - page.margins.bottom;
            for el in &page.elements {
                assert!(el.y + el.height <= bottom + 1e-6, "{:?}", el);
            }
        }

        let rows: usize = d
            .pages()
            .iter()
            .map(|p| p.text_lines().filter(|l| l.text.starts_with("row ")).count())
            .sum();
        assert_eq!(rows, 120);
    }

    #[test]
    fn fixed_width_tables_are_centered() {
        let mut d = doc();
        let mut t = Table::new();
        t.add_row(["x"]);
        t.set_column_width(0, 100.0);
        d.write_table(&t, &NoImages);
        let frame = d.pages()[0]
            .elements
            .iter()
            .find(|el| matches!(el.draw, DrawCommand::Rect { background: None, .. }))
            .unwrap();
        let expected = d.content_left() + (d.printable_width() - 100.0) / 2.0;
        assert!((frame.x - expected).abs() < 1e-9);
        assert!((frame.width - 100.0).abs() < 1e-9);
    }

    #[test]
    fn min_height_and_shading() {
        let mut d = doc();
        let mut t = Table::new();
        t.set_column_count(2);
        t.column_style_mut(0).unwrap().min_height = 100.0;
        t.add_row(["a", "b"]);
        t.add_row(["c", "d"]);
        let start = d.y();
        d.write_table(&t, &NoImages);
        assert!((d.y() - start - 2.0 * 108.0).abs() < 1e-9);

        let shaded = d.pages()[0]
            .elements
            .iter()
            .filter(|el| matches!(el.draw, DrawCommand::Rect { background: Some(c), .. } if c == ROW_SHADE))
            .count();
        assert_eq!(shaded, 1);
    }

    #[test]
    fn hook_sees_every_data_cell() {
        let mut d = doc();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut t = Table::new();
        t.set_header(["h1", "h2"]);
        t.add_row(["a", "b"]);
        t.add_row(["c", "d"]);
        let sink = Arc::clone(&seen);
        t.on_before_draw_cell(move |doc, cell| {
            sink.lock().unwrap().push((cell.row, cell.column, cell.text.to_string()));
            doc.fill_rect(cell.rect, Color::WHITE);
        });
        d.write_table(&t, &NoImages);
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (0, 0, "a".to_string()),
                (0, 1, "b".to_string()),
                (1, 0, "c".to_string()),
                (1, 1, "d".to_string()),
            ]
        );
    }

    #[test]
    fn markdown_cells_render_and_fit() {
        let mut d = doc();
        let mut t = Table::new();
        t.add_row(["!MD*Name*\nsecond line\nthird line", "plain"]);
        let start = d.y();
        d.write_table(&t, &NoImages);
        let page = &d.pages()[0];
        let name = page.find_text("Name").unwrap();
        assert!(name.bold);
        assert!(page.find_text("third line").is_some());
        assert!(page.text_lines().all(|l| !l.text.contains("!MD")));
        // three markdown lines at 10pt plus padding
        assert!((d.y() - start - (3.0 * 12.0 + 8.0)).abs() < 1e-6);
    }

    #[test]
    fn right_aligned_cells_end_at_padding() {
        let mut d = doc();
        let mut t = Table::new();
        t.add_row(["label", "12.00"]);
        t.set_column_width(1, 100.0);
        t.column_style_mut(1).unwrap().align = TextAlign::Right;
        d.write_table(&t, &NoImages);
        let value = d.pages()[0].find_text("12.00").unwrap();
        let right = d.content_right() - 5.0;
        assert!((value.x + value.width - right).abs() < 1e-6);
    }
}
