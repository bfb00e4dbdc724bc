//! # Sections and Table of Contents
//!
//! Opening a section draws its title and records it, together with the
//! page it starts on, in a section forest. The table of contents is a
//! separate pass over that forest once the body is done.
//!
//! Top-level sections always start on an odd (right-hand) page.

use super::Document;
use crate::style::*;
use crate::text::ellipsize;

/// A titled part of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    /// Page the section starts on.
    pub page: usize,
    pub children: Vec<Section>,
}

impl Section {
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
            children: Vec::new(),
        }
    }

    /// This section and all descendants, pre-order, with their depth
    /// relative to this section.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

/// Pre-order iterator over a section forest.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Section)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Section);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, section) = self.stack.pop()?;
        for child in section.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, section))
    }
}

/// Walk every root of a forest in order.
pub fn walk_all(sections: &[Section]) -> Walk<'_> {
    Walk {
        stack: sections.iter().rev().map(|s| (0, s)).collect(),
    }
}

/// Section forest plus the path of indices to the innermost open section.
#[derive(Debug, Default)]
pub(crate) struct SectionTracker {
    roots: Vec<Section>,
    open: Vec<usize>,
}

impl SectionTracker {
    /// Record a section at `depth` (0 = top level). Needs an open parent
    /// one level up.
    fn open_at(&mut self, depth: usize, title: &str, page: usize) -> bool {
        if self.open.len() < depth {
            return false;
        }
        self.open.truncate(depth);
        let mut siblings = &mut self.roots;
        for &index in &self.open {
            siblings = &mut siblings[index].children;
        }
        siblings.push(Section::new(title, page));
        self.open.push(siblings.len() - 1);
        true
    }
}

/// Table of contents geometry, relative to the left margin.
const TOC_INDENT: f64 = 15.0;
const TOC_TEXT_LEFT: f64 = 20.0;
const TOC_NUMBER_WIDTH: f64 = 20.0;

impl Document {
    pub fn sections(&self) -> &[Section] {
        &self.sections.roots
    }

    /// Start a top-level section on the next odd page.
    pub fn open_section(&mut self, title: &str) {
        self.advance_page();
        if self.page_number() % 2 == 0 {
            self.advance_page();
        }
        let page = self.page_number();
        self.sections.open_at(0, title, page);
        log::debug!("Section '{}' on page {}", title, page);

        let style = Style::new(&self.roles.sans, 24.0).with_bold(true);
        let center = self.content_left() + self.printable_width() / 2.0;
        let y = self.y();
        self.save_style();
        self.set_style(style.clone());
        self.text_centered(title, center, y);
        self.restore_style();

        let rule_y = y + style.line_height() + 8.0;
        let (left, right) = (self.content_left(), self.content_right());
        self.line(left, rule_y, right, rule_y, Color::BLACK, 1.0);
        self.set_xy(left, rule_y + 40.0);
    }

    /// Start a sub-section of the open section.
    pub fn open_sub_section(&mut self, title: &str) -> bool {
        if self.sections.open.is_empty() {
            log::error!("Sub-section '{}' opened outside of a section", title);
            return false;
        }
        self.new_lines(2);
        self.ensure_vertical_space(100.0);
        let page = self.page_number();
        self.sections.open_at(1, title, page);

        let style = Style::new(&self.roles.sans, 18.0).with_bold(true);
        let left = self.content_left();
        let y = self.y();
        self.save_style();
        self.set_style(style.clone());
        self.text_at(title, left, y);
        self.restore_style();

        let rule_y = y + style.line_height() + 4.0;
        let right = self.content_right();
        self.line(left, rule_y, right, rule_y, ACCENT_DARK, 1.0);
        self.set_xy(left, rule_y + 24.0);
        true
    }

    /// Start a sub-sub-section of the open sub-section.
    pub fn open_sub_sub_section(&mut self, title: &str) -> bool {
        if self.sections.open.len() < 2 {
            log::error!("Sub-sub-section '{}' opened outside of a sub-section", title);
            return false;
        }
        self.new_line();
        self.ensure_vertical_space(100.0);
        let page = self.page_number();
        self.sections.open_at(2, title, page);

        let style = Style::new(&self.roles.body, 16.0).with_bold(true);
        let left = self.content_left();
        let y = self.y();
        self.save_style();
        self.set_style(style.clone());
        self.text_at(title, left + 20.0, y);
        self.restore_style();
        self.set_xy(left, y + style.line_height() + 14.0);
        true
    }

    /// Append the table of contents, starting on an odd page without
    /// running header.
    pub fn write_table_of_contents(&mut self, title: &str) {
        let print_header = self.print_header();
        self.set_print_header(false);
        self.advance_page();
        if self.page_number() % 2 == 0 {
            self.advance_page();
        }

        let title_style = Style::new(&self.roles.body, 24.0).with_bold(true);
        let center = self.content_left() + self.printable_width() / 2.0;
        let y = self.y();
        self.save_style();
        self.set_style(title_style.clone());
        self.text_centered(title, center, y);
        self.restore_style();
        self.set_y(y + title_style.line_height() + 50.0);

        let entries: Vec<(usize, String, usize)> = walk_all(self.sections())
            .map(|(depth, s)| (depth, s.title.clone(), s.page))
            .collect();

        self.save_style();
        for (depth, title, page) in entries {
            let style = Style::new(&self.roles.body, 14.0).with_bold(depth < 2);
            self.set_style(style.clone());
            self.ensure_vertical_space(style.line_height());
            self.write_toc_line(depth, &title, page, &style);
            self.new_line();
        }
        self.restore_style();
        self.set_print_header(print_header);
    }

    fn write_toc_line(&mut self, depth: usize, title: &str, page: usize, style: &Style) {
        let left = self.content_left();
        let width = self.printable_width();
        let indent = TOC_INDENT * (depth + 1) as f64;
        let text_width = width * 2.0 / 3.0;
        let number_right = width - TOC_NUMBER_WIDTH;
        let y = self.y();

        let text_x = left + TOC_TEXT_LEFT + indent;
        let (shown, shown_width) = ellipsize(self.fonts(), title, text_width - indent, style);
        self.draw_text_line(&shown, text_x, y, style);

        let number_x = self.draw_text_in_box(
            &page.to_string(),
            left + number_right,
            y,
            TOC_NUMBER_WIDTH,
            TextAlign::Right,
            style,
        );

        let leader_y = y + style.font_size * 0.9;
        let (from, to) = (text_x + shown_width + 2.0, number_x - 2.0);
        if to > from {
            self.line(from, leader_y, to, leader_y, RULE_GRAY, 0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::layout::DrawCommand;

    fn doc() -> Document {
        Document::new(FontContext::new())
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let mut root = Section::new("A", 1);
        let mut b = Section::new("B", 2);
        b.children.push(Section::new("C", 3));
        root.children.push(b);
        root.children.push(Section::new("D", 4));
        let got: Vec<_> = root.walk().map(|(d, s)| (d, s.title.as_str())).collect();
        assert_eq!(got, vec![(0, "A"), (1, "B"), (2, "C"), (1, "D")]);
    }

    #[test]
    fn sections_start_on_odd_pages() {
        let mut d = doc();
        d.open_section("One");
        assert_eq!(d.page_number(), 1);
        d.text("filler");
        d.open_section("Two");
        assert_eq!(d.page_number(), 3);
        d.advance_page();
        d.open_section("Three");
        assert_eq!(d.page_number(), 5);
        let pages: Vec<_> = d.sections().iter().map(|s| s.page).collect();
        assert_eq!(pages, vec![1, 3, 5]);
        assert!(d.pages()[2].find_text("Two").is_some());
    }

    #[test]
    fn children_need_an_open_parent() {
        let mut d = doc();
        assert!(!d.open_sub_section("orphan"));
        assert!(d.sections().is_empty());
        d.open_section("Root");
        assert!(!d.open_sub_sub_section("too deep"));
        assert!(d.open_sub_section("Child"));
        assert!(d.open_sub_sub_section("Grandchild"));
        assert!(d.open_sub_section("Second child"));
        let root = &d.sections()[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children[0].title, "Grandchild");
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn sub_section_moves_to_next_page_when_low_on_space() {
        let mut d = doc();
        d.open_section("Root");
        d.set_y(d.content_bottom() - 80.0);
        d.open_sub_section("Late");
        assert_eq!(d.page_number(), 2);
        assert_eq!(d.sections()[0].children[0].page, 2);
    }

    #[test]
    fn toc_lists_every_section_with_its_page() {
        let mut d = doc();
        d.open_section("Alpha");
        d.open_sub_section("Alpha one");
        d.open_sub_sub_section("Alpha one deep");
        d.open_section("Beta");
        let body_pages = d.page_number();
        d.write_table_of_contents("Contents");

        assert_eq!(d.page_number() % 2, 1);
        assert!(d.page_number() > body_pages);
        let toc = d.pages().last().unwrap();
        assert!(toc.find_text("Contents").is_some());
        // no running header on the TOC page
        assert!(toc.find_text(&toc.number.to_string()).is_none());

        for (title, page, bold) in [
            ("Alpha", 1, true),
            ("Alpha one", 1, true),
            ("Alpha one deep", 1, false),
            ("Beta", 3, true),
        ] {
            let line = toc.find_text(title).unwrap();
            assert_eq!(line.bold, bold, "{}", title);
            let number = toc
                .text_lines()
                .find(|l| l.text == page.to_string() && (l.y - line.y).abs() < 1e-9)
                .unwrap();
            assert!((number.x + number.width - d.content_right()).abs() < 1e-6);
        }

        let leaders = toc
            .elements
            .iter()
            .filter(|el| matches!(el.draw, DrawCommand::Line { width, .. } if width == 0.5))
            .count();
        assert_eq!(leaders, 4);
        assert!(d.print_header());
    }

    #[test]
    fn long_toc_titles_are_ellipsized() {
        let mut d = doc();
        let long = "An extraordinarily long section title that could never fit on one table of contents line";
        d.open_section(long);
        d.write_table_of_contents("Contents");
        let toc = d.pages().last().unwrap();
        assert!(toc.texts().iter().any(|t| t.ends_with("...") && t.starts_with("An extra")));
    }
}
