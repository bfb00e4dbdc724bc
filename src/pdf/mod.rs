//! # PDF Serializer
//!
//! Writes laid-out pages as a PDF 1.7 file. A report only needs text,
//! filled and stroked rectangles, lines and raster images, so the file is
//! assembled by hand:
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj  Catalog
//! 2 0 obj  Pages
//! ...      fonts, images, then per page: content stream + page dict
//! ...      Info
//! xref / trailer / %%EOF
//! ```
//!
//! Content streams and raster data are FlateDecode compressed; JPEG data is
//! passed through with DCTDecode.

mod content;
mod encoding;
mod fonts;
mod images;
mod objects;

use crate::error::Result;
use crate::font::FontContext;
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::model::Metadata;

use content::ContentStream;
use encoding::text_string;
use fonts::FontSet;
use images::ImageSet;
use objects::ObjectTable;

pub(crate) use encoding::win_ansi_byte;

#[derive(Debug, Default)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata, fonts: &FontContext) -> Result<Vec<u8>> {
        let mut objects = ObjectTable::new();
        let catalog = objects.reserve();
        let page_tree = objects.reserve();

        let font_set = FontSet::build(&mut objects, pages, fonts)?;
        let image_set = ImageSet::build(&mut objects, pages);
        let font_resources = font_set.resource_entries();

        let mut kids = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let mut stream = ContentStream::new(page.height);
            for (element_index, element) in page.elements.iter().enumerate() {
                let image = image_set.name(index, element_index);
                paint(&mut stream, element, image.as_deref(), &font_set, fonts);
            }
            let contents = objects.add_stream("", &stream.into_bytes(), true);

            let xobjects = image_set.resource_entries(index);
            let mut resources = format!("/Font << {} >>", font_resources);
            if !xobjects.is_empty() {
                resources.push_str(&format!(" /XObject << {} >>", xobjects));
            }
            kids.push(objects.add(format!(
                "<< /Type /Page /Parent {} /MediaBox [0 0 {:.2} {:.2}] /Contents {} /Resources << {} >> >>",
                page_tree, page.width, page.height, contents, resources
            )));
        }

        objects.set(catalog, format!("<< /Type /Catalog /Pages {} >>", page_tree));
        let kid_list: Vec<String> = kids.iter().map(ToString::to_string).collect();
        objects.set(
            page_tree,
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kid_list.join(" "), kids.len()),
        );
        let info = objects.add(info_dict(metadata));
        Ok(objects.finish(catalog, info))
    }
}

fn info_dict(metadata: &Metadata) -> String {
    let mut dict = String::from("<<");
    let fields = [
        ("Title", metadata.title.as_deref()),
        ("Author", metadata.author.as_deref()),
        ("Subject", metadata.subject.as_deref()),
        ("Creator", Some(metadata.creator.as_deref().unwrap_or("folio"))),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            dict.push_str(&format!(" /{} {}", name, text_string(value)));
        }
    }
    let producer = format!("folio {}", env!("CARGO_PKG_VERSION"));
    dict.push_str(&format!(" /Producer {} >>", text_string(&producer)));
    dict
}

fn paint(
    stream: &mut ContentStream,
    element: &LayoutElement,
    image: Option<&str>,
    font_set: &FontSet,
    fonts: &FontContext,
) {
    match &element.draw {
        DrawCommand::Rect {
            background,
            border_width,
            border_color,
        } => {
            if let Some(fill) = background.filter(|c| c.a > 0.0) {
                stream
                    .save()
                    .fill_color(fill)
                    .rect(element.x, element.y, element.width, element.height)
                    .fill()
                    .restore();
            }
            if *border_width > 0.0 {
                stream
                    .save()
                    .stroke_color(*border_color)
                    .line_width(*border_width)
                    .rect(element.x, element.y, element.width, element.height)
                    .stroke()
                    .restore();
            }
        }
        DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            stream
                .save()
                .stroke_color(*color)
                .line_width(*width)
                .move_to(*x1, *y1)
                .line_to(*x2, *y2)
                .stroke()
                .restore();
        }
        DrawCommand::Text { lines, color } => {
            stream.begin_text().fill_color(*color);
            for line in lines {
                font_set.show(stream, line, fonts);
            }
            stream.end_text();
        }
        DrawCommand::Image { clip, .. } => {
            let Some(name) = image else {
                log::warn!("Image at ({:.0}, {:.0}) has no XObject", element.x, element.y);
                return;
            };
            stream.save();
            if let Some(clip) = clip {
                stream.rect(clip.x, clip.y, clip.w, clip.h).clip();
            }
            stream
                .draw_xobject(name, element.x, element.y, element.width, element.height)
                .restore();
        }
    }
}
