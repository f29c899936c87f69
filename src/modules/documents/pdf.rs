//! Single-page PDF writer on top of `lopdf`.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! Text uses the standard Helvetica faces so no font files are embedded.

use edunexus_core::AppError;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::warn;

/// Longest side of an embedded photo, in pixels.
const PHOTO_MAX_PX: u32 = 400;

pub const NOT_AVAILABLE: &str = "N/A";

/// Blank or missing values print as `N/A`.
pub fn or_na(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

struct Photo {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

pub struct Page {
    width: i64,
    height: i64,
    ops: Vec<Operation>,
    photo: Option<Photo>,
}

/// The standard fonts only cover Latin-1; anything else prints as `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

impl Page {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            photo: None,
        }
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn text(&mut self, font: Font, size: i64, x: i64, y: i64, text: &str) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Centres text using an average Helvetica glyph width of half an em.
    pub fn text_centered(&mut self, font: Font, size: i64, y: i64, text: &str) {
        let estimated = text.chars().count() as i64 * size / 2;
        let x = ((self.width - estimated) / 2).max(0);
        self.text(font, size, x, y, text);
    }

    /// Label in bold followed by its value.
    pub fn field(&mut self, size: i64, x: i64, y: i64, label: &str, value: &str) {
        self.text(Font::Bold, size, x, y, label);
        let offset = (label.chars().count() as i64 + 1) * size * 11 / 20;
        self.text(Font::Regular, size, x + offset, y, value);
    }

    pub fn rect(&mut self, x: i64, y: i64, w: i64, h: i64) {
        self.ops.extend([
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    pub fn line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        self.ops.extend([
            Operation::new("m", vec![x1.into(), y1.into()]),
            Operation::new("l", vec![x2.into(), y2.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    pub fn line_width(&mut self, width: i64) {
        self.ops.push(Operation::new("w", vec![width.into()]));
    }

    /// Draws the photo scaled into the box, or an empty labelled box when
    /// there is no photo or it cannot be decoded.
    pub fn photo(&mut self, bytes: Option<&[u8]>, x: i64, y: i64, w: i64, h: i64) {
        let decoded = bytes.and_then(|b| match image::load_from_memory(b) {
            Ok(img) => Some(img.thumbnail(PHOTO_MAX_PX, PHOTO_MAX_PX).to_rgb8()),
            Err(e) => {
                warn!(error = %e, "Photo could not be decoded; drawing placeholder");
                None
            }
        });

        match decoded {
            Some(rgb) if self.photo.is_none() => {
                let (width, height) = rgb.dimensions();
                self.photo = Some(Photo {
                    width,
                    height,
                    rgb: rgb.into_raw(),
                });
                self.ops.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
                    ),
                    Operation::new("Do", vec!["Im1".into()]),
                    Operation::new("Q", vec![]),
                ]);
                self.rect(x, y, w, h);
            }
            _ => {
                self.rect(x, y, w, h);
                self.text(Font::Regular, 8, x + w / 2 - 12, y + h / 2, "PHOTO");
            }
        }
    }

    pub fn finish(self) -> Result<Vec<u8>, AppError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut resources = dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        };
        if let Some(photo) = self.photo {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(photo.width),
                    "Height" => i64::from(photo.height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                photo.rgb,
            ));
            resources.set("XObject", dictionary! { "Im1" => image_id });
        }
        let resources_id = doc.add_object(resources);

        let content = Content {
            operations: self.ops,
        };
        let encoded = content.encode().map_err(AppError::internal)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buf = Vec::new();
        doc.save_to(&mut buf).map_err(AppError::internal)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_print_na() {
        assert_eq!(or_na(None), "N/A");
        assert_eq!(or_na(Some("  ")), "N/A");
        assert_eq!(or_na(Some("Lucknow")), "Lucknow");
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(encode_text("Añil ✓"), vec![b'A', 0xF1, b'i', b'l', b' ', b'?']);
    }

    #[test]
    fn page_without_photo_renders_placeholder() {
        let mut page = Page::new(300, 200);
        page.text(Font::Bold, 12, 10, 180, "Hello (world)");
        page.photo(None, 10, 10, 60, 80);
        assert!(page.photo.is_none());

        let pdf = page.finish().unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn undecodable_photo_falls_back_to_placeholder() {
        let mut page = Page::new(300, 200);
        page.photo(Some(b"not an image"), 10, 10, 60, 80);
        assert!(page.photo.is_none());
        assert!(page.finish().is_ok());
    }

    #[test]
    fn decodable_photo_is_embedded() {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut page = Page::new(300, 200);
        page.photo(Some(&png), 10, 10, 60, 80);
        let photo = page.photo.as_ref().unwrap();
        assert_eq!((photo.width, photo.height), (4, 4));
        assert!(page.finish().is_ok());
    }
}
