//! Image XObjects.
//!
//! The same avatar is usually drawn several times (My Authors, Sponsored,
//! the post thumbnails), so identical pixel data is embedded once and every
//! placement references that object.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use super::objects::{ObjRef, ObjectTable};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutPage};

pub(crate) struct ImageSet {
    /// XObject per distinct image, named `/Im{index}`.
    objects: Vec<ObjRef>,
    /// (page, element) to image index.
    placements: HashMap<(usize, usize), usize>,
}

impl ImageSet {
    pub(crate) fn build(table: &mut ObjectTable, pages: &[LayoutPage]) -> Self {
        let mut objects = Vec::new();
        let mut placements = HashMap::new();
        let mut seen: HashMap<u64, Vec<(usize, &LoadedImage)>> = HashMap::new();

        for (page_index, page) in pages.iter().enumerate() {
            for (element_index, element) in page.elements.iter().enumerate() {
                let DrawCommand::Image { image_data, .. } = &element.draw else {
                    continue;
                };
                let candidates = seen.entry(fingerprint(image_data)).or_default();
                let known = candidates
                    .iter()
                    .find(|(_, other)| same_pixels(other, image_data))
                    .map(|(index, _)| *index);
                let index = match known {
                    Some(index) => index,
                    None => {
                        objects.push(embed(table, image_data));
                        candidates.push((objects.len() - 1, image_data));
                        objects.len() - 1
                    }
                };
                placements.insert((page_index, element_index), index);
            }
        }
        if !placements.is_empty() {
            log::debug!("{} image placements, {} distinct images", placements.len(), objects.len());
        }
        Self { objects, placements }
    }

    /// Resource name for an image element.
    pub(crate) fn name(&self, page: usize, element: usize) -> Option<String> {
        self.placements
            .get(&(page, element))
            .map(|index| format!("Im{}", index))
    }

    /// Entries of the page's `/XObject` dictionary, empty when the page has
    /// no images.
    pub(crate) fn resource_entries(&self, page: usize) -> String {
        let used: BTreeMap<usize, ObjRef> = self
            .placements
            .iter()
            .filter(|((p, _), _)| *p == page)
            .map(|(_, &index)| (index, self.objects[index]))
            .collect();
        used.iter()
            .map(|(index, obj)| format!("/Im{} {}", index, obj))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn fingerprint(image: &LoadedImage) -> u64 {
    let mut hasher = DefaultHasher::new();
    (image.width_px, image.height_px).hash(&mut hasher);
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, .. } => data.hash(&mut hasher),
        ImagePixelData::Decoded { rgb, alpha } => {
            rgb.hash(&mut hasher);
            alpha.hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn same_pixels(a: &LoadedImage, b: &LoadedImage) -> bool {
    if (a.width_px, a.height_px) != (b.width_px, b.height_px) {
        return false;
    }
    match (&a.pixel_data, &b.pixel_data) {
        (ImagePixelData::Jpeg { data: x, .. }, ImagePixelData::Jpeg { data: y, .. }) => x == y,
        (
            ImagePixelData::Decoded { rgb: x, alpha: xa },
            ImagePixelData::Decoded { rgb: y, alpha: ya },
        ) => x == y && xa == ya,
        _ => false,
    }
}

fn embed(table: &mut ObjectTable, image: &LoadedImage) -> ObjRef {
    let size = format!(
        "/Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8",
        image.width_px, image.height_px
    );
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, color_space } => {
            let space = match color_space {
                JpegColorSpace::DeviceRGB => "/DeviceRGB",
                JpegColorSpace::DeviceGray => "/DeviceGray",
            };
            let entries = format!("{} /ColorSpace {} /Filter /DCTDecode", size, space);
            table.add_stream(&entries, data, false)
        }
        ImagePixelData::Decoded { rgb, alpha } => {
            let smask = alpha.as_ref().map(|alpha| {
                let entries = format!("{} /ColorSpace /DeviceGray", size);
                table.add_stream(&entries, alpha, true)
            });
            let mut entries = format!("{} /ColorSpace /DeviceRGB", size);
            if let Some(smask) = smask {
                entries.push_str(&format!(" /SMask {}", smask));
            }
            table.add_stream(&entries, rgb, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutElement;
    use crate::model::Edges;

    fn rgb(pixel: [u8; 3], alpha: Option<u8>) -> LoadedImage {
        LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: pixel.to_vec(),
                alpha: alpha.map(|a| vec![a]),
            },
            width_px: 1,
            height_px: 1,
        }
    }

    fn page(images: Vec<LoadedImage>) -> LayoutPage {
        LayoutPage {
            number: 1,
            width: 595.28,
            height: 841.89,
            margins: Edges::uniform(40.0),
            elements: images
                .into_iter()
                .map(|image_data| LayoutElement {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 10.0,
                    draw: DrawCommand::Image { image_data, clip: None },
                })
                .collect(),
        }
    }

    #[test]
    fn identical_images_share_one_xobject() {
        let avatar = rgb([1, 2, 3], None);
        let pages = vec![page(vec![avatar.clone(), rgb([9, 9, 9], None)]), page(vec![avatar])];
        let mut table = ObjectTable::new();
        let set = ImageSet::build(&mut table, &pages);

        assert_eq!(set.objects.len(), 2);
        assert_eq!(set.name(0, 0).as_deref(), Some("Im0"));
        assert_eq!(set.name(0, 1).as_deref(), Some("Im1"));
        assert_eq!(set.name(1, 0).as_deref(), Some("Im0"));
        assert_eq!(set.resource_entries(1), "/Im0 1 0 R");
        assert_eq!(set.resource_entries(0), "/Im0 1 0 R /Im1 2 0 R");
        assert_eq!(set.resource_entries(2), "");
    }

    #[test]
    fn alpha_becomes_a_soft_mask() {
        let mut table = ObjectTable::new();
        let set = ImageSet::build(&mut table, &[page(vec![rgb([255, 0, 0], Some(128))])]);
        // mask first, then the image that references it
        assert_eq!(set.resource_entries(0), "/Im0 2 0 R");
        let info = table.add("<< >>");
        let bytes = table.finish(info, info);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/ColorSpace /DeviceGray"));
        assert!(text.contains("/SMask 1 0 R"));
    }

    #[test]
    fn jpeg_passes_through_with_dct() {
        let jpeg = LoadedImage {
            pixel_data: ImagePixelData::Jpeg {
                data: vec![0xFF, 0xD8, 0xFF, 0xD9],
                color_space: JpegColorSpace::DeviceGray,
            },
            width_px: 4,
            height_px: 2,
        };
        let mut table = ObjectTable::new();
        ImageSet::build(&mut table, &[page(vec![jpeg])]);
        let info = table.add("<< >>");
        let bytes = table.finish(info, info);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Width 4 /Height 2"));
        assert!(text.contains("/ColorSpace /DeviceGray /Filter /DCTDecode"));
        assert!(!text.contains("FlateDecode"));
    }
}
