//! # Images
//!
//! Avatars, post thumbnails and images referenced from post bodies arrive
//! as raw bytes from the content store. JPEG data is embedded as-is with
//! DCTDecode, so only its frame header is read here. Anything else the
//! `image` crate can decode is flattened to 8-bit RGB, with the alpha
//! channel kept separately when the image is not fully opaque.

use std::io::Cursor;

use base64::Engine;
use image::ImageFormat;

use crate::error::{FolioError, Result};

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Width over height.
    pub fn aspect(&self) -> f64 {
        if self.height_px == 0 {
            return 1.0;
        }
        self.width_px as f64 / self.height_px as f64
    }
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Untouched JPEG stream.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// `rgb` holds 3 bytes per pixel, `alpha` 1 byte per pixel when present.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Source of decoded images for the layout engine.
///
/// Passed explicitly into every render call that may draw images.
pub trait ImageProvider {
    fn load(&self, url: &str) -> Result<LoadedImage>;
}

/// Provider for documents without images.
pub struct NoImages;

impl ImageProvider for NoImages {
    fn load(&self, url: &str) -> Result<LoadedImage> {
        Err(FolioError::Image(format!("no image source for '{}'", url)))
    }
}

/// Decode a `data:image/...;base64,...` URI, as post bodies sometimes
/// inline small pictures.
pub fn decode_data_uri(uri: &str) -> Result<LoadedImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FolioError::Image("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FolioError::Image("data URI without payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(FolioError::Image(format!("unsupported data URI encoding '{}'", header)));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| FolioError::Image(format!("bad base64 in data URI: {}", e)))?;
    decode_image_bytes(&bytes).map_err(FolioError::Image)
}

/// Sniff the format and decode.
pub fn decode_image_bytes(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => read_jpeg_frame(data),
        Ok(_) => flatten(data),
        Err(_) => Err(format!("unrecognized image data ({} bytes)", data.len())),
    }
}

/// Walk the marker segments up to the first start-of-frame and take the
/// dimensions and component count from it.
fn read_jpeg_frame(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return Err(format!("corrupt JPEG marker at byte {}", pos));
        }
        let marker = data[pos + 1];
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let frame = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if frame {
            // length, precision, height, width, components
            let Some(segment) = data.get(pos + 4..pos + 10) else {
                break;
            };
            let height = u16::from_be_bytes([segment[1], segment[2]]) as u32;
            let width = u16::from_be_bytes([segment[3], segment[4]]) as u32;
            let color_space = match segment[5] {
                1 => JpegColorSpace::DeviceGray,
                3 => JpegColorSpace::DeviceRGB,
                n => return Err(format!("JPEG with {} components is not supported", n)),
            };
            return Ok(LoadedImage {
                pixel_data: ImagePixelData::Jpeg {
                    data: data.to_vec(),
                    color_space,
                },
                width_px: width,
                height_px: height,
            });
        }
        pos += 2 + len;
    }
    Err("JPEG without a frame header".to_string())
}

fn flatten(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let decoded = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| format!("cannot decode image: {}", e))?;
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();

    let pixels = rgba.as_raw();
    let rgb: Vec<u8> = pixels
        .chunks_exact(4)
        .flat_map(|p| [p[0], p[1], p[2]])
        .collect();
    let opaque = pixels.chunks_exact(4).all(|p| p[3] == u8::MAX);
    let alpha = (!opaque).then(|| pixels.chunks_exact(4).map(|p| p[3]).collect());

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded { rgb, alpha },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(pixels: &[u8], width: u32, height: u32, color: image::ColorType) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, pixels, width, height, color).unwrap();
        buf
    }

    fn jpeg(width: u32, height: u32, color: image::ColorType) -> Vec<u8> {
        let channels = if color == image::ColorType::L8 { 1 } else { 3 };
        let pixels = vec![120u8; (width * height) as usize * channels];
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, &pixels, width, height, color).unwrap();
        buf
    }

    #[test]
    fn jpeg_is_kept_with_its_frame_dimensions() {
        let bytes = jpeg(7, 3, image::ColorType::Rgb8);
        let img = decode_image_bytes(&bytes).unwrap();
        assert_eq!((img.width_px, img.height_px), (7, 3));
        match img.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert_eq!(data, bytes);
                assert_eq!(color_space, JpegColorSpace::DeviceRGB);
            }
            ImagePixelData::Decoded { .. } => panic!("JPEG must not be re-encoded"),
        }
    }

    #[test]
    fn gray_jpeg_uses_device_gray() {
        let img = decode_image_bytes(&jpeg(2, 2, image::ColorType::L8)).unwrap();
        assert!(matches!(
            img.pixel_data,
            ImagePixelData::Jpeg { color_space: JpegColorSpace::DeviceGray, .. }
        ));
    }

    #[test]
    fn truncated_jpeg_is_rejected() {
        let bytes = jpeg(4, 4, image::ColorType::Rgb8);
        assert!(decode_image_bytes(&bytes[..6]).is_err());
    }

    #[test]
    fn opaque_png_has_no_alpha() {
        let bytes = encode(&[10, 20, 30, 255, 40, 50, 60, 255], 2, 1, image::ColorType::Rgba8);
        let img = decode_image_bytes(&bytes).unwrap();
        match &img.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[10, 20, 30, 40, 50, 60]);
                assert!(alpha.is_none());
            }
            ImagePixelData::Jpeg { .. } => panic!("PNG decoded as JPEG"),
        }
        assert!((img.aspect() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn translucent_png_keeps_alpha() {
        let bytes = encode(&[255, 0, 0, 128], 1, 1, image::ColorType::Rgba8);
        match decode_image_bytes(&bytes).unwrap().pixel_data {
            ImagePixelData::Decoded { alpha, .. } => assert_eq!(alpha, Some(vec![128])),
            ImagePixelData::Jpeg { .. } => panic!("PNG decoded as JPEG"),
        }
    }

    #[test]
    fn gray_png_becomes_rgb() {
        let bytes = encode(&[10, 200], 2, 1, image::ColorType::L8);
        match decode_image_bytes(&bytes).unwrap().pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, vec![10, 10, 10, 200, 200, 200]);
                assert!(alpha.is_none());
            }
            ImagePixelData::Jpeg { .. } => panic!("PNG decoded as JPEG"),
        }
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_image_bytes(&[]).is_err());
        assert!(decode_image_bytes(b"not an image at all").is_err());
    }

    #[test]
    fn data_uri() {
        let png = encode(&[0, 255, 0, 255], 1, 1, image::ColorType::Rgba8);
        let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
        let img = decode_data_uri(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!((img.width_px, img.height_px), (1, 1));

        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("pics/a.png").is_err());
        assert!(matches!(NoImages.load("a.png"), Err(FolioError::Image(_))));
    }
}
