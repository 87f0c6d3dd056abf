//! Page images as PDF image XObjects.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, ObjectId, Stream};

use crate::error::Result;

/// A decoded raster ready to embed in a PDF.
///
/// Pixels are stored as Flate-compressed RGB samples, with an optional
/// grayscale soft mask for images that carry alpha.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Decode PNG (or JPEG) bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        let (width, height) = (image.width(), image.height());

        let alpha = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            let mask: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
            // Fully opaque masks add nothing.
            mask.iter().any(|&a| a != u8::MAX).then_some(mask)
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            rgb: image.to_rgb8().into_raw(),
            alpha,
        })
    }

    /// Whether the image carries a soft mask.
    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Add the image (and its mask) to `doc`, returning the image object id.
    pub fn embed(&self, doc: &mut Document) -> Result<ObjectId> {
        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };

        if let Some(ref alpha) = self.alpha {
            let mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(self.width),
                    "Height" => i64::from(self.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                deflate(alpha)?,
            );
            let mask_id = doc.add_object(mask);
            image_dict.set("SMask", mask_id);
        }

        let mut stream = Stream::new(image_dict, deflate(&self.rgb)?);
        // Already compressed; keep Document::compress from touching it.
        stream.allows_compression = false;
        Ok(doc.add_object(stream))
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encode a solid-color RGB PNG.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_rgb() {
        let xobject = ImageXObject::decode(&png(4, 3)).unwrap();
        assert_eq!((xobject.width, xobject.height), (4, 3));
        assert_eq!(xobject.rgb.len(), 4 * 3 * 3);
        assert!(!xobject.has_alpha());
    }

    #[test]
    fn test_decode_translucent_keeps_mask() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 128]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();

        let xobject = ImageXObject::decode(&out.into_inner()).unwrap();
        assert!(xobject.has_alpha());
    }

    #[test]
    fn test_decode_opaque_rgba_drops_mask() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();

        let xobject = ImageXObject::decode(&out.into_inner()).unwrap();
        assert!(!xobject.has_alpha());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(ImageXObject::decode(b"not an image").is_err());
    }

    #[test]
    fn test_embed_adds_objects() {
        let mut doc = Document::with_version("1.5");
        let xobject = ImageXObject::decode(&png(2, 2)).unwrap();
        let id = xobject.embed(&mut doc).unwrap();
        assert!(doc.get_object(id).is_ok());
        assert_eq!(doc.objects.len(), 1);
    }
}
