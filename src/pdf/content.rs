//! Page content stream builder.
//!
//! Callers speak in layout coordinates (origin top-left, y down); the
//! builder flips to PDF user space (origin bottom-left, y up).

use std::fmt::{self, Write};

use crate::style::Color;

pub(crate) struct ContentStream {
    ops: String,
    page_height: f64,
}

impl ContentStream {
    pub(crate) fn new(page_height: f64) -> Self {
        Self {
            ops: String::new(),
            page_height,
        }
    }

    fn op(&mut self, args: fmt::Arguments<'_>) -> &mut Self {
        let _ = self.ops.write_fmt(args);
        self.ops.push('\n');
        self
    }

    fn flip(&self, y: f64) -> f64 {
        self.page_height - y
    }

    pub(crate) fn save(&mut self) -> &mut Self {
        self.op(format_args!("q"))
    }

    pub(crate) fn restore(&mut self) -> &mut Self {
        self.op(format_args!("Q"))
    }

    pub(crate) fn fill_color(&mut self, c: Color) -> &mut Self {
        self.op(format_args!("{:.3} {:.3} {:.3} rg", c.r, c.g, c.b))
    }

    pub(crate) fn stroke_color(&mut self, c: Color) -> &mut Self {
        self.op(format_args!("{:.3} {:.3} {:.3} RG", c.r, c.g, c.b))
    }

    pub(crate) fn line_width(&mut self, width: f64) -> &mut Self {
        self.op(format_args!("{:.2} w", width))
    }

    /// Rectangle path from its top-left corner.
    pub(crate) fn rect(&mut self, x: f64, top: f64, w: f64, h: f64) -> &mut Self {
        let bottom = self.flip(top + h);
        self.op(format_args!("{:.2} {:.2} {:.2} {:.2} re", x, bottom, w, h))
    }

    pub(crate) fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let y = self.flip(y);
        self.op(format_args!("{:.2} {:.2} m", x, y))
    }

    pub(crate) fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let y = self.flip(y);
        self.op(format_args!("{:.2} {:.2} l", x, y))
    }

    pub(crate) fn fill(&mut self) -> &mut Self {
        self.op(format_args!("f"))
    }

    pub(crate) fn stroke(&mut self) -> &mut Self {
        self.op(format_args!("S"))
    }

    /// Intersect the clip with the current path and discard the path.
    pub(crate) fn clip(&mut self) -> &mut Self {
        self.op(format_args!("W\nn"))
    }

    pub(crate) fn begin_text(&mut self) -> &mut Self {
        self.op(format_args!("BT"))
    }

    pub(crate) fn end_text(&mut self) -> &mut Self {
        self.op(format_args!("ET"))
    }

    pub(crate) fn font(&mut self, resource: usize, size: f64) -> &mut Self {
        self.op(format_args!("/F{} {:.1} Tf", resource, size))
    }

    /// Absolute text position; `baseline` in layout coordinates.
    pub(crate) fn text_origin(&mut self, x: f64, baseline: f64) -> &mut Self {
        let y = self.flip(baseline);
        self.op(format_args!("1 0 0 1 {:.2} {:.2} Tm", x, y))
    }

    /// Show an already escaped literal string.
    pub(crate) fn show_literal(&mut self, escaped: &str) -> &mut Self {
        self.op(format_args!("({}) Tj", escaped))
    }

    /// Show two-byte glyph ids.
    pub(crate) fn show_glyphs(&mut self, glyphs: impl IntoIterator<Item = u16>) -> &mut Self {
        let mut hex = String::new();
        for gid in glyphs {
            let _ = write!(hex, "{:04X}", gid);
        }
        self.op(format_args!("<{}> Tj", hex))
    }

    /// Paint an XObject scaled into the box with top-left corner (x, top).
    pub(crate) fn draw_xobject(&mut self, name: &str, x: f64, top: f64, w: f64, h: f64) -> &mut Self {
        let bottom = self.flip(top + h);
        self.op(format_args!("{:.4} 0 0 {:.4} {:.2} {:.2} cm", w, h, x, bottom))
            .op(format_args!("/{} Do", name))
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(build: impl FnOnce(&mut ContentStream)) -> String {
        let mut stream = ContentStream::new(800.0);
        build(&mut stream);
        String::from_utf8(stream.into_bytes()).unwrap()
    }

    #[test]
    fn y_axis_is_flipped() {
        let out = ops(|s| {
            s.rect(10.0, 20.0, 30.0, 40.0).move_to(0.0, 0.0).line_to(5.0, 800.0);
        });
        assert_eq!(out, "10.00 740.00 30.00 40.00 re\n0.00 800.00 m\n5.00 0.00 l\n");
    }

    #[test]
    fn text_operators() {
        let out = ops(|s| {
            s.begin_text()
                .font(2, 12.0)
                .text_origin(54.0, 64.8)
                .show_literal("Hi")
                .show_glyphs([0x24, 0x1F3])
                .end_text();
        });
        assert_eq!(out, "BT\n/F2 12.0 Tf\n1 0 0 1 54.00 735.20 Tm\n(Hi) Tj\n<002401F3> Tj\nET\n");
    }

    #[test]
    fn xobject_placement() {
        let out = ops(|s| {
            s.save().draw_xobject("Im3", 10.0, 100.0, 50.0, 25.0).restore();
        });
        assert_eq!(out, "q\n50.0000 0 0 25.0000 10.00 675.00 cm\n/Im3 Do\nQ\n");
    }

    #[test]
    fn colors_and_widths() {
        let out = ops(|s| {
            s.fill_color(Color::rgb(1.0, 0.5, 0.0)).stroke_color(Color::BLACK).line_width(0.75);
        });
        assert_eq!(out, "1.000 0.500 0.000 rg\n0.000 0.000 0.000 RG\n0.75 w\n");
    }
}
