//! # Fonts
//!
//! Maps a (family, bold) pair to something we can measure and embed.
//!
//! The standard PDF fonts need no embedding and are measured with their AFM
//! widths. Common aliases ("Arial", "serif", "monospace") land on the
//! nearest standard face. TrueType fonts registered at startup (a DejaVu
//! family for Cyrillic reports, say) are measured through their unicode
//! cmap and embedded whole by the PDF writer.
//!
//! Resolution order for a request:
//!
//! 1. a registered TrueType face with that family and weight
//! 2. the regular weight of that TrueType family
//! 3. the standard face the family name maps to
//! 4. Helvetica in the requested weight

pub mod metrics;

use std::collections::HashMap;

use crate::error::{FolioError, Result};
pub use metrics::StandardFontMetrics;

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool) -> Self {
        Self {
            family: family.to_string(),
            bold,
        }
    }
}

/// The standard PDF fonts the report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The standard face for a family name, case-insensitive.
    pub fn lookup(family: &str, bold: bool) -> Option<Self> {
        let family = family.trim().to_ascii_lowercase();
        let face = match family.as_str() {
            "helvetica" | "arial" | "sans" | "sans-serif" => (Self::Helvetica, Self::HelveticaBold),
            "times" | "times-roman" | "times new roman" | "serif" => (Self::TimesRoman, Self::TimesBold),
            "courier" | "courier new" | "mono" | "monospace" => (Self::Courier, Self::CourierBold),
            _ => return None,
        };
        Some(if bold { face.1 } else { face.0 })
    }

    /// Family name the face is registered under in the PDF resources.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Helvetica | Self::HelveticaBold => "Helvetica",
            Self::TimesRoman | Self::TimesBold => "Times",
            Self::Courier | Self::CourierBold => "Courier",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Self::HelveticaBold | Self::TimesBold | Self::CourierBold)
    }

    /// The PDF `/BaseFont` name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
            // monospaced: bold has the same advances
            Self::Courier | Self::CourierBold => &metrics::COURIER,
        }
    }

    fn key(&self) -> FontKey {
        FontKey::new(self.family(), self.is_bold())
    }
}

/// One glyph of a TrueType face: its id and advance in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u16,
    pub advance: u16,
}

/// Metrics read from a TrueType face via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    glyphs: HashMap<char, Glyph>,
    /// Advance for characters the face has no glyph for.
    missing_advance: u16,
}

impl CustomFontMetrics {
    /// Read the unicode cmap subtables and every mapped glyph's advance.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return None;
        }

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(id) = subtable.glyph_index(code) {
                        let advance = face.glyph_hor_advance(id).unwrap_or(0);
                        glyphs.entry(ch).or_insert(Glyph { id: id.0, advance });
                    }
                });
            }
        }

        let missing_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .filter(|a| *a > 0)
            .unwrap_or(units_per_em / 2);

        Some(Self {
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            glyphs,
            missing_advance,
        })
    }

    pub fn glyph(&self, ch: char) -> Option<Glyph> {
        self.glyphs.get(&ch).copied()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Advance of `ch` in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let advance = self.glyph(ch).map_or(self.missing_advance, |g| g.advance);
        advance as f64 / self.units_per_em as f64 * font_size
    }
}

/// A registered TrueType face and its raw bytes for embedding.
#[derive(Debug, Clone)]
pub struct CustomFont {
    pub data: Vec<u8>,
    pub metrics: CustomFontMetrics,
}

/// What a (family, bold) request resolves to.
#[derive(Debug, Clone, Copy)]
pub enum FontData<'a> {
    Standard(StandardFont),
    Custom(&'a CustomFont),
}

impl FontData<'_> {
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match self {
            FontData::Standard(font) => font.metrics().char_width(ch, font_size),
            FontData::Custom(font) => font.metrics.char_width(ch, font_size),
        }
    }

    /// Whether the face can show `ch`: WinAnsi for standard fonts, a cmap
    /// entry for registered ones.
    pub fn encodes(&self, ch: char) -> bool {
        match self {
            FontData::Standard(_) => crate::pdf::win_ansi_byte(ch).is_some(),
            FontData::Custom(font) => font.metrics.glyph(ch).is_some(),
        }
    }
}

/// Registered TrueType faces. Standard fonts are always available and are
/// not stored here.
#[derive(Debug, Default)]
pub struct FontRegistry {
    custom: HashMap<FontKey, CustomFont>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType face. Fails if ttf-parser cannot read it.
    pub fn register(&mut self, family: &str, bold: bool, data: Vec<u8>) -> Result<()> {
        let metrics = CustomFontMetrics::parse(&data)
            .ok_or_else(|| FolioError::Font(format!("'{}' is not a readable TrueType font", family)))?;
        log::debug!(
            "Registered font '{}' (bold: {}, {} glyphs)",
            family,
            bold,
            metrics.glyph_count()
        );
        self.custom
            .insert(FontKey::new(family, bold), CustomFont { data, metrics });
        Ok(())
    }

    pub fn resolve(&self, family: &str, bold: bool) -> FontData<'_> {
        match self.custom_key(family, bold) {
            Some(key) => match self.custom.get(&key) {
                Some(font) => FontData::Custom(font),
                None => FontData::Standard(Self::standard(family, bold)),
            },
            None => FontData::Standard(Self::standard(family, bold)),
        }
    }

    /// The key `resolve` actually lands on, so every alias of one face
    /// shares a single PDF font object.
    pub fn resolved_key(&self, family: &str, bold: bool) -> FontKey {
        self.custom_key(family, bold)
            .unwrap_or_else(|| Self::standard(family, bold).key())
    }

    pub fn is_registered(&self, family: &str, bold: bool) -> bool {
        self.custom.contains_key(&FontKey::new(family, bold))
    }

    fn custom_key(&self, family: &str, bold: bool) -> Option<FontKey> {
        let exact = FontKey::new(family, bold);
        if self.custom.contains_key(&exact) {
            return Some(exact);
        }
        let regular = FontKey::new(family, false);
        (bold && self.custom.contains_key(&regular)).then_some(regular)
    }

    fn standard(family: &str, bold: bool) -> StandardFont {
        StandardFont::lookup(family, bold).unwrap_or(if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        })
    }
}

/// Shared font context used by layout and PDF serialization.
#[derive(Debug, Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn char_width(&self, ch: char, family: &str, bold: bool, font_size: f64) -> f64 {
        self.resolve(family, bold).char_width(ch, font_size)
    }

    /// Width of `text` in points, no kerning.
    pub fn measure_string(&self, text: &str, family: &str, bold: bool, font_size: f64) -> f64 {
        match self.resolve(family, bold) {
            FontData::Standard(font) => font.metrics().measure_string(text, font_size),
            face => text.chars().map(|ch| face.char_width(ch, font_size)).sum(),
        }
    }

    pub fn resolve(&self, family: &str, bold: bool) -> FontData<'_> {
        self.registry.resolve(family, bold)
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space_width() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', "Helvetica", false, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn measure_uses_afm_widths() {
        let ctx = FontContext::new();
        // H e l l o = 722 + 556 + 222 + 222 + 556
        let w = ctx.measure_string("Hello", "Helvetica", false, 12.0);
        assert!((w - 2278.0 * 12.0 / 1000.0).abs() < 1e-9);
        assert!(ctx.char_width('A', "Helvetica", true, 12.0) > ctx.char_width('A', "Helvetica", false, 12.0));
        assert!(
            ctx.measure_string("monthly report", "Times", false, 12.0)
                < ctx.measure_string("monthly report", "Helvetica", false, 12.0)
        );
    }

    #[test]
    fn aliases_map_to_standard_faces() {
        assert_eq!(StandardFont::lookup("Arial", true), Some(StandardFont::HelveticaBold));
        assert_eq!(StandardFont::lookup("serif", false), Some(StandardFont::TimesRoman));
        assert_eq!(StandardFont::lookup(" MONOSPACE ", false), Some(StandardFont::Courier));
        assert_eq!(StandardFont::lookup("DejaVu Sans", false), None);

        let registry = FontRegistry::new();
        assert_eq!(registry.resolved_key("Arial", false), FontKey::new("Helvetica", false));
        assert_eq!(registry.resolved_key("Times New Roman", true), FontKey::new("Times", true));
    }

    #[test]
    fn unknown_family_falls_back_to_helvetica() {
        let ctx = FontContext::new();
        let known = ctx.char_width('A', "Helvetica", false, 12.0);
        let unknown = ctx.char_width('A', "UnknownFont", false, 12.0);
        assert!((known - unknown).abs() < 1e-9);
        assert_eq!(
            ctx.registry().resolved_key("UnknownFont", true),
            FontKey::new("Helvetica", true)
        );
        assert!(matches!(
            ctx.resolve("UnknownFont", true),
            FontData::Standard(StandardFont::HelveticaBold)
        ));
    }

    #[test]
    fn garbage_font_data_is_rejected() {
        let mut ctx = FontContext::new();
        let err = ctx
            .registry_mut()
            .register("Broken", false, vec![0, 1, 2, 3])
            .unwrap_err();
        assert!(matches!(err, FolioError::Font(_)));
        assert!(!ctx.registry().is_registered("Broken", false));
    }
}
