//! Image extraction: format sniffing and base64 payloads.

use base64::Engine;

use super::chart::position;
use super::Extraction;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::model::{Image, ImageFormat};
use crate::source::SourceImage;

/// Detect the raster format from leading bytes only.
pub fn detect_format(data: &[u8]) -> ImageFormat {
    if data.len() < 12 {
        return ImageFormat::Unknown;
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        ImageFormat::Png
    } else if data.starts_with(&[0xFF, 0xD8]) {
        ImageFormat::Jpeg
    } else if data.starts_with(b"BM") {
        ImageFormat::Bmp
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        ImageFormat::Gif
    } else if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        ImageFormat::Webp
    } else {
        ImageFormat::Unknown
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageExtractor;

impl ImageExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_all(
        &self,
        images: &[SourceImage],
        sheet: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<Image> {
        images
            .iter()
            .enumerate()
            .filter_map(|(i, image)| {
                let context = format!("image {} on '{}'", i + 1, sheet);
                self.extract(image, &context).settle(diagnostics)
            })
            .collect()
    }

    /// An unreadable payload recovers the image; everything else has a default.
    pub fn extract(&self, image: &SourceImage, context: &str) -> Extraction<Image> {
        let data = match &image.data {
            Ok(data) => data,
            Err(fault) => {
                return Extraction::Recovered(ExtractionWarning::new(
                    context,
                    format!("payload unreadable: {}", fault),
                ))
            }
        };

        let placement = image.anchor.as_ref().map(position).unwrap_or_default();
        Extraction::Extracted(Image {
            format: detect_format(data),
            data: base64::engine::general_purpose::STANDARD.encode(data),
            width: image.width.unwrap_or(0),
            height: image.height.unwrap_or(0),
            anchor: placement.anchor,
            x_offset: placement.x_offset,
            y_offset: placement.y_offset,
            description: image.description.clone().filter(|d| !d.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectedDiagnostics;
    use crate::source::{AnchorMarker, SourceAnchor, SourceFault};

    const PNG: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ];

    #[test]
    fn test_magic_bytes() {
        assert_eq!(detect_format(&PNG), ImageFormat::Png);
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0]), ImageFormat::Jpeg);
        assert_eq!(detect_format(b"BM\0\0\0\0\0\0\0\0\0\0"), ImageFormat::Bmp);
        assert_eq!(detect_format(b"GIF89a\0\0\0\0\0\0"), ImageFormat::Gif);
        assert_eq!(detect_format(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::Webp);
        assert_eq!(detect_format(b"RIFF\0\0\0\0WAVEfmt "), ImageFormat::Unknown);
    }

    #[test]
    fn test_short_payload_is_unknown() {
        assert_eq!(detect_format(&PNG[..8]), ImageFormat::Unknown);
        assert_eq!(detect_format(&[]), ImageFormat::Unknown);
    }

    #[test]
    fn test_extract_encodes_and_anchors() {
        let image = SourceImage {
            data: Ok(PNG.to_vec()),
            width: Some(64),
            height: Some(32),
            anchor: Some(SourceAnchor {
                from: Some(AnchorMarker {
                    col: 1,
                    row: 2,
                    col_offset: 5,
                    row_offset: 7,
                }),
                ..Default::default()
            }),
            description: Some("logo".to_string()),
        };

        let extracted = ImageExtractor::new().extract(&image, "image 1").into_option().unwrap();
        assert_eq!(extracted.format, ImageFormat::Png);
        assert_eq!(extracted.anchor, "B3");
        assert_eq!((extracted.x_offset, extracted.y_offset), (5, 7));
        assert_eq!(
            base64::engine::general_purpose::STANDARD.decode(&extracted.data).unwrap(),
            PNG.to_vec()
        );
    }

    #[test]
    fn test_unreadable_image_is_skipped() {
        let diagnostics = CollectedDiagnostics::new();
        let good = SourceImage {
            data: Ok(PNG.to_vec()),
            width: None,
            height: None,
            anchor: None,
            description: None,
        };
        let bad = SourceImage {
            data: Err(SourceFault::new("media part missing")),
            ..good.clone()
        };

        let images = ImageExtractor::new().extract_all(&[bad, good], "Data", &diagnostics);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].anchor, "A1");
        assert_eq!(diagnostics.warnings().len(), 1);
    }
}
