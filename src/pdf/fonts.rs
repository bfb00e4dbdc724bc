//! Font resources.
//!
//! Every face used by any text line becomes one `/Fn` resource shared by all
//! pages. Standard faces are Type1 references with WinAnsi encoding.
//! Registered TrueType faces are embedded whole as a Type0 font over a
//! CIDFontType2 descendant with Identity-H encoding and a ToUnicode map, so
//! text shows as glyph ids and still extracts as Unicode.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;

use super::content::ContentStream;
use super::encoding::{font_name, win_ansi_literal};
use super::objects::{ObjRef, ObjectTable};
use crate::error::{FolioError, Result};
use crate::font::{CustomFont, FontContext, FontData, FontKey};
use crate::layout::{LayoutPage, TextLine};

struct FontResource {
    key: FontKey,
    object: ObjRef,
    /// Glyph ids for embedded faces, `None` for standard fonts.
    glyphs: Option<HashMap<char, u16>>,
}

pub(crate) struct FontSet {
    resources: Vec<FontResource>,
}

impl FontSet {
    /// Emit one font object per face that the pages use.
    pub(crate) fn build(objects: &mut ObjectTable, pages: &[LayoutPage], fonts: &FontContext) -> Result<Self> {
        let mut used: BTreeMap<FontKey, BTreeSet<char>> = BTreeMap::new();
        for line in pages.iter().flat_map(LayoutPage::text_lines) {
            let key = fonts.registry().resolved_key(&line.font_family, line.bold);
            used.entry(key).or_default().extend(line.text.chars());
        }
        if used.is_empty() {
            used.insert(FontKey::new("Helvetica", false), BTreeSet::new());
        }

        let mut resources = Vec::with_capacity(used.len());
        for (key, chars) in used {
            let resource = match fonts.resolve(&key.family, key.bold) {
                FontData::Standard(face) => FontResource {
                    object: objects.add(format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        face.pdf_name()
                    )),
                    key,
                    glyphs: None,
                },
                FontData::Custom(face) => {
                    let (object, glyphs) = embed_truetype(objects, &key, face, &chars)?;
                    FontResource {
                        key,
                        object,
                        glyphs: Some(glyphs),
                    }
                }
            };
            resources.push(resource);
        }
        Ok(Self { resources })
    }

    /// Entries of the `/Font` resource dictionary.
    pub(crate) fn resource_entries(&self) -> String {
        let mut out = String::new();
        for (index, resource) in self.resources.iter().enumerate() {
            if index > 0 {
                out.push(' ');
            }
            let _ = write!(out, "/F{} {}", index, resource.object);
        }
        out
    }

    /// Show one line of text in its resolved face.
    pub(crate) fn show(&self, stream: &mut ContentStream, line: &TextLine, fonts: &FontContext) {
        let key = fonts.registry().resolved_key(&line.font_family, line.bold);
        let (index, resource) = self
            .resources
            .iter()
            .enumerate()
            .find(|(_, r)| r.key == key)
            .map_or((0, None), |(i, r)| (i, Some(r)));

        stream.font(index, line.font_size).text_origin(line.x, line.y);
        match resource.and_then(|r| r.glyphs.as_ref()) {
            Some(glyphs) => {
                stream.show_glyphs(line.text.chars().map(|ch| glyphs.get(&ch).copied().unwrap_or(0)));
            }
            None => {
                stream.show_literal(&win_ansi_literal(&line.text));
            }
        }
    }
}

/// FontFile2, FontDescriptor, CIDFont, ToUnicode and the Type0 root.
/// Returns the root and the glyph ids of `chars`.
fn embed_truetype(
    objects: &mut ObjectTable,
    key: &FontKey,
    font: &CustomFont,
    chars: &BTreeSet<char>,
) -> Result<(ObjRef, HashMap<char, u16>)> {
    let face = ttf_parser::Face::parse(&font.data, 0)
        .map_err(|e| FolioError::Font(format!("cannot embed '{}': {}", key.family, e)))?;
    let metrics = &font.metrics;
    let scale = 1000.0 / metrics.units_per_em as f64;
    let name = font_name(&key.family, key.bold);

    let glyphs: HashMap<char, u16> = chars
        .iter()
        .filter_map(|&ch| metrics.glyph(ch).map(|g| (ch, g.id)))
        .collect();

    let file = objects.add_stream(&format!("/Length1 {}", font.data.len()), &font.data, true);

    let bbox = face.global_bounding_box();
    let units = |v: i16| (v as f64 * scale).round() as i32;
    let descriptor = objects.add(format!(
        "<< /Type /FontDescriptor /FontName /{} /Flags 32 /FontBBox [{} {} {} {}] \
         /ItalicAngle 0 /Ascent {} /Descent {} /CapHeight {} /StemV {} /FontFile2 {} >>",
        name,
        units(bbox.x_min),
        units(bbox.y_min),
        units(bbox.x_max),
        units(bbox.y_max),
        units(metrics.ascender),
        units(metrics.descender),
        units(face.capital_height().unwrap_or(metrics.ascender)),
        if key.bold { 120 } else { 80 },
        file
    ));

    let mut widths: BTreeMap<u16, u32> = BTreeMap::new();
    for &ch in chars {
        if let Some(glyph) = metrics.glyph(ch) {
            widths.insert(glyph.id, (glyph.advance as f64 * scale).round() as u32);
        }
    }
    let missing_width = face
        .glyph_hor_advance(ttf_parser::GlyphId(0))
        .map_or(1000, |a| (a as f64 * scale).round() as u32);
    let cid_font = objects.add(format!(
        "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
         /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
         /FontDescriptor {} /DW {} /W {} /CIDToGIDMap /Identity >>",
        name,
        descriptor,
        missing_width,
        width_array(&widths)
    ));

    let cmap = to_unicode_cmap(&glyphs, &name);
    let to_unicode = objects.add_stream("", cmap.as_bytes(), true);

    let root = objects.add(format!(
        "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
         /DescendantFonts [{}] /ToUnicode {} >>",
        name, cid_font, to_unicode
    ));
    log::debug!("Embedded '{}' with {} used glyphs", name, glyphs.len());
    Ok((root, glyphs))
}

/// `/W` array with runs of consecutive glyph ids grouped:
/// `[3 [500 600] 10 [250]]`.
fn width_array(widths: &BTreeMap<u16, u32>) -> String {
    let mut out = String::from("[");
    let mut run_end: Option<u16> = None;
    for (&gid, &width) in widths {
        let continues = run_end.is_some_and(|end| end.checked_add(1) == Some(gid));
        if continues {
            let _ = write!(out, " {}", width);
        } else {
            if run_end.is_some() {
                out.push(']');
            }
            let _ = write!(out, " {} [{}", gid, width);
        }
        run_end = Some(gid);
    }
    if run_end.is_some() {
        out.push(']');
    }
    out.push_str(" ]");
    out
}

/// CMap from glyph ids back to UTF-16 for copy and search.
fn to_unicode_cmap(glyphs: &HashMap<char, u16>, name: &str) -> String {
    let mut pairs: Vec<(u16, char)> = glyphs.iter().map(|(&ch, &gid)| (gid, ch)).collect();
    pairs.sort_unstable();
    pairs.dedup_by_key(|(gid, _)| *gid);

    let mut cmap = String::new();
    let _ = write!(
        cmap,
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /{}-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        name
    );
    for block in pairs.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", block.len());
        for (gid, ch) in block {
            let mut units = [0u16; 2];
            let hex: String = ch.encode_utf16(&mut units).iter().map(|u| format!("{:04X}", u)).collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, hex);
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
