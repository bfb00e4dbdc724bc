//! # Markdown Rendering
//!
//! Walks a [`MdNode`] tree and flows it into the document, either through
//! the rest of the page with automatic page breaks or bounded to a box
//! (table cells, the info block next to a post thumbnail).
//!
//! Every node saves the active style on entry and restores it on exit, so
//! formatting nests the way the markdown does and a render pass always
//! leaves the style stack as it found it, even when a bounded region runs
//! out of room halfway through.

use super::{Document, INDENT_WIDTH};
use crate::error::Result;
use crate::image_loader::{ImageProvider, LoadedImage};
use crate::markdown::{self, MdNode, NodeKind};
use crate::model::Rect;
use crate::style::ACCENT_DARK;
use crate::text::{split_words, wrap_greedy};

/// Hosts whose links are rendered as a text placeholder instead of an image.
pub const VIDEO_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "youtu.be", "vimeo.com"];
pub const VIDEO_PLACEHOLDER: &str = "<<Video>> ";

/// Where a render pass ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOutcome {
    /// Remaining area below the last line drawn. On another page than the
    /// one the pass started on if auto-paging kicked in.
    pub region: Rect,
    /// A bounded pass ran out of room and stopped early.
    pub overflowed: bool,
}

/// State of one render pass.
struct Pass<'a> {
    region: Rect,
    auto_page: bool,
    overflowed: bool,
    /// Something has been drawn in this pass.
    started: bool,
    /// The next paragraph continues the line a list bullet started.
    skip_newline: bool,
    /// Ordered list counters, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    images: &'a dyn ImageProvider,
}

/// True when `url` points at a known video site.
pub fn is_video_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("//"));
    let Some(rest) = rest else {
        return false;
    };
    let host = rest
        .split(|c| matches!(c, '/' | '?' | '#' | ':'))
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    VIDEO_HOSTS.contains(&host.as_str())
}

fn is_space_token(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_whitespace)
}

impl Document {
    /// Render markdown through the rest of the page, breaking pages as
    /// needed.
    pub fn markdown(&mut self, src: &str, images: &dyn ImageProvider) -> Result<RenderOutcome> {
        let node = markdown::parse(src)?;
        self.ensure_page();
        let region = self.remaining_area();
        Ok(self.render_md_node(&node, region, true, images))
    }

    /// Render markdown into `rect`. Without `auto_page` the pass stops at
    /// the bottom of the box.
    pub fn markdown_in(
        &mut self,
        src: &str,
        rect: Rect,
        auto_page: bool,
        images: &dyn ImageProvider,
    ) -> Result<RenderOutcome> {
        let node = markdown::parse(src)?;
        self.ensure_page();
        Ok(self.render_md_node(&node, rect, auto_page, images))
    }

    /// Render an already parsed tree starting at the top-left of `region`.
    pub fn render_md_node(
        &mut self,
        node: &MdNode,
        region: Rect,
        auto_page: bool,
        images: &dyn ImageProvider,
    ) -> RenderOutcome {
        let outer_indent = self.cursor.indent;
        self.cursor.indent = 0;
        self.set_xy(region.x, region.y);

        let mut pass = Pass {
            region,
            auto_page: auto_page && !self.dry_run,
            overflowed: false,
            started: false,
            skip_newline: false,
            lists: Vec::new(),
            images,
        };
        self.render_node(node, &mut pass);
        if !pass.overflowed && self.line_has_content(&pass) {
            self.break_line(&pass);
        }

        self.cursor.indent = outer_indent;
        let y = self.cursor.y;
        RenderOutcome {
            region: Rect::new(
                pass.region.x,
                y,
                pass.region.w,
                (pass.region.bottom() - y).max(0.0),
            ),
            overflowed: pass.overflowed,
        }
    }

    /// Height `node` takes when rendered `width` points wide. Nothing is
    /// drawn and the cursor is left where it was.
    pub(crate) fn measure_markdown(&mut self, node: &MdNode, width: f64, images: &dyn ImageProvider) -> f64 {
        let cursor = self.cursor;
        let was_dry = self.dry_run;
        self.dry_run = true;
        let start = 0.0;
        let outcome = self.render_md_node(node, Rect::new(0.0, start, width, 1.0e9), false, images);
        self.dry_run = was_dry;
        self.cursor = cursor;
        outcome.region.y - start
    }

    fn render_node(&mut self, node: &MdNode, pass: &mut Pass<'_>) {
        if pass.overflowed {
            return;
        }
        self.save_style();
        self.enter_node(node, pass);
        if !matches!(node.kind, NodeKind::Image { .. }) {
            for child in &node.children {
                if pass.overflowed {
                    break;
                }
                self.render_node(child, pass);
            }
        }
        self.exit_node(node, pass);
        self.restore_style();
    }

    fn enter_node(&mut self, node: &MdNode, pass: &mut Pass<'_>) {
        let body = self.font_roles().body.clone();
        let mono = self.font_roles().mono.clone();
        match &node.kind {
            NodeKind::Document => {
                self.update_style(|s| {
                    let size = s.font_size;
                    s.with_font(&body, size).with_bold(false)
                });
            }
            NodeKind::Heading(level) => {
                let scale = if *level == 1 { 1.5 } else { 1.2 };
                self.update_style(|s| {
                    let size = s.font_size * scale;
                    s.with_font(&body, size).with_bold(true)
                });
                if self.line_has_content(pass) {
                    self.break_line(pass);
                }
            }
            NodeKind::Paragraph | NodeKind::CodeBlock => {
                let family = if node.kind == NodeKind::CodeBlock { mono } else { body };
                self.update_style(|s| {
                    let size = s.font_size;
                    s.with_font(&family, size)
                });
                if pass.skip_newline {
                    pass.skip_newline = false;
                } else if pass.started {
                    if self.line_has_content(pass) {
                        self.break_line(pass);
                    }
                    self.break_line(pass);
                }
            }
            NodeKind::Emphasis => self.update_style(|s| s.with_bold(true)),
            NodeKind::Strong => self.update_style(|s| s.with_bold(true).with_color(ACCENT_DARK)),
            NodeKind::List { ordered, start } => {
                pass.lists.push(ordered.then_some(*start));
                self.cursor.indent += 1;
            }
            NodeKind::ListItem => {
                if self.line_has_content(pass) {
                    self.break_line(pass);
                }
                self.cursor.x = self.line_start(pass);
                let marker = match pass.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "\u{2022} ".to_string(),
                };
                self.flow_text(&marker, pass);
                pass.skip_newline = true;
            }
            NodeKind::LineBreak => self.break_line(pass),
            NodeKind::Image { url } => {
                if is_video_url(url) {
                    self.flow_text(VIDEO_PLACEHOLDER, pass);
                } else {
                    self.place_image(url, pass);
                }
            }
            NodeKind::Link { .. } => {
                self.update_style(|s| {
                    let size = s.font_size;
                    s.with_font(&body, size).with_bold(false)
                });
            }
            NodeKind::Code(text) => {
                self.update_style(|s| {
                    let size = s.font_size;
                    s.with_font(&mono, size)
                });
                self.flow_text(text, pass);
            }
            NodeKind::Text(text) => self.flow_text(text, pass),
            NodeKind::Unknown => {}
        }
    }

    fn exit_node(&mut self, node: &MdNode, pass: &mut Pass<'_>) {
        match &node.kind {
            NodeKind::Heading(_) | NodeKind::Paragraph | NodeKind::CodeBlock => {
                if !pass.overflowed && self.line_has_content(pass) {
                    self.break_line(pass);
                }
            }
            NodeKind::List { .. } => {
                pass.lists.pop();
                self.cursor.indent = self.cursor.indent.saturating_sub(1);
            }
            NodeKind::ListItem => pass.skip_newline = false,
            _ => {}
        }
    }

    fn line_start(&self, pass: &Pass<'_>) -> f64 {
        pass.region.x + self.cursor.indent as f64 * INDENT_WIDTH
    }

    fn line_has_content(&self, pass: &Pass<'_>) -> bool {
        self.cursor.x > self.line_start(pass) + 0.01
    }

    fn break_line(&mut self, pass: &Pass<'_>) {
        self.cursor.y += self.style().line_height();
        self.cursor.x = self.line_start(pass);
    }

    /// Continue on a new page, or give up in a bounded region.
    fn page_break(&mut self, pass: &mut Pass<'_>) -> bool {
        if !pass.auto_page {
            pass.overflowed = true;
            return false;
        }
        self.advance_page();
        pass.region = self.remaining_area();
        self.cursor.x = self.line_start(pass);
        true
    }

    fn flow_text(&mut self, text: &str, pass: &mut Pass<'_>) {
        let style = self.style().clone();
        let line_height = style.line_height();
        let mut words = split_words(text);

        while !words.is_empty() {
            let at_start = !self.line_has_content(pass);
            if at_start && is_space_token(&words[0]) {
                words.remove(0);
                continue;
            }
            if self.cursor.y + line_height > pass.region.bottom() {
                if !self.page_break(pass) {
                    return;
                }
                continue;
            }

            // A word that does not fit the rest of a started line moves down
            // instead of being split.
            let available = pass.region.right() - self.cursor.x;
            if !at_start && self.measure(&words[0], &style) > available {
                self.break_line(pass);
                continue;
            }

            let wrapped = wrap_greedy(self.fonts(), &words, available, &style);
            let (x, y) = (self.cursor.x, self.cursor.y);
            self.draw_text_line(&wrapped.line, x, y, &style);
            pass.started = true;
            self.cursor.x += wrapped.width;
            words = wrapped.rest;
            if !words.is_empty() {
                self.break_line(pass);
            }
        }
    }

    /// Left edge and drawn size of an image at the current line start.
    fn image_box(&self, image: &LoadedImage, pass: &Pass<'_>) -> (f64, f64, f64) {
        let left = self.line_start(pass);
        let native_w = image.width_px as f64;
        let native_h = image.height_px as f64;
        let mut w = native_w.min((pass.region.right() - left).max(0.0));
        let mut h = native_h * w / native_w;

        let max_h = if pass.auto_page {
            self.printable_height() - self.style().line_height()
        } else {
            pass.region.h
        };
        if h > max_h && max_h > 0.0 {
            w *= max_h / h;
            h = max_h;
        }
        (left, w, h)
    }

    /// Images are never enlarged; 1 px is drawn as 1 pt.
    fn place_image(&mut self, url: &str, pass: &mut Pass<'_>) {
        let image = match pass.images.load(url) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Skipping image '{}': {}", url, e);
                return;
            }
        };
        if image.width_px == 0 || image.height_px == 0 {
            return;
        }

        if self.line_has_content(pass) {
            self.break_line(pass);
        }
        let (mut left, mut w, mut h) = self.image_box(&image, pass);
        if self.cursor.y + h > pass.region.bottom() {
            if !self.page_break(pass) {
                return;
            }
            // margins swap with page parity
            (left, w, h) = self.image_box(&image, pass);
        }
        let top = self.cursor.y;
        self.image(&image, Rect::new(left, top, w, h));
        pass.started = true;
        self.cursor.y = top + h;
        self.cursor.x = left;
    }
}
