// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: turn a standalone raster image into a one-page PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use pagewerk_core::Rotation;
use pagewerk_core::error::PagewerkError;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;

/// One image pixel becomes one PDF point.
const IMAGE_DPI: f32 = 72.0;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Title of the intermediate one-page document; never reaches the output.
const IMAGE_PAGE_TITLE: &str = "Pagewerk Image";

/// Creates single-page PDFs from raster images.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Create a single-page PDF whose page is exactly the size of the image
    /// (after `rotation`), with the image filling it.
    ///
    /// The rotation is applied to the pixels before placement, so the page
    /// itself carries no /Rotate.
    #[instrument(skip(self, image_bytes), fields(bytes_len = image_bytes.len(), rotation = %rotation))]
    pub fn create_image_page(
        &self,
        image_bytes: &[u8],
        rotation: Rotation,
    ) -> Result<Vec<u8>, PagewerkError> {
        let processor = ImageProcessor::from_bytes(image_bytes)?.rotate(rotation);
        let img_width = processor.width() as usize;
        let img_height = processor.height() as usize;

        info!(img_width, img_height, "Creating image page");

        // printpdf moves the alpha channel of RGBA8 into an /SMask.
        let dynamic = processor.into_dynamic();
        let (pixels, data_format) = if dynamic.color().has_alpha() {
            (dynamic.to_rgba8().into_raw(), RawImageFormat::RGBA8)
        } else {
            (dynamic.to_rgb8().into_raw(), RawImageFormat::RGB8)
        };
        let raw = RawImage {
            pixels: RawImageData::U8(pixels),
            width: img_width,
            height: img_height,
            data_format,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(IMAGE_PAGE_TITLE);
        let xobject_id = doc.add_image(&raw);

        let page_w = Mm(img_width as f32 * MM_PER_PT);
        let page_h = Mm(img_height as f32 * MM_PER_PT);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "Image page written"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::processor::tests::sample_png;
    use crate::pdf::reader::PdfReader;

    #[test]
    fn image_page_matches_native_size() {
        let bytes = PdfWriter::new()
            .create_image_page(&sample_png(200, 100), Rotation::NONE)
            .expect("image page");

        let reader = PdfReader::from_bytes(&bytes).expect("load");
        assert_eq!(reader.page_count(), 1);

        let geometry = reader.page_geometry(0).expect("geometry");
        assert!((geometry.width_pt - 200.0).abs() < 1.0, "width {}", geometry.width_pt);
        assert!((geometry.height_pt - 100.0).abs() < 1.0, "height {}", geometry.height_pt);
        assert_eq!(geometry.rotation, Rotation::NONE);
    }

    #[test]
    fn rotated_image_page_swaps_dimensions() {
        let bytes = PdfWriter::new()
            .create_image_page(&sample_png(200, 100), Rotation::from_degrees(270).expect("valid"))
            .expect("image page");

        let geometry = PdfReader::from_bytes(&bytes)
            .expect("load")
            .page_geometry(0)
            .expect("geometry");
        assert!((geometry.width_pt - 100.0).abs() < 1.0);
        assert!((geometry.height_pt - 200.0).abs() < 1.0);
    }

    fn image_streams(bytes: &[u8]) -> Vec<lopdf::Dictionary> {
        let document = lopdf::Document::load_mem(bytes).expect("load");
        document
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| {
                stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|subtype| subtype.as_name())
                    .is_ok_and(|name| name == b"Image")
            })
            .map(|stream| stream.dict.clone())
            .collect()
    }

    #[test]
    fn transparent_image_keeps_its_alpha_as_a_soft_mask() {
        let clear = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 0]));
        let png = ImageProcessor::from_dynamic(image::DynamicImage::ImageRgba8(clear))
            .to_png_bytes()
            .expect("encode png");
        let bytes = PdfWriter::new().create_image_page(&png, Rotation::NONE).expect("image page");

        let images = image_streams(&bytes);
        assert!(images.iter().any(|dict| dict.has(b"SMask")));
    }

    #[test]
    fn opaque_image_has_no_soft_mask() {
        let bytes = PdfWriter::new()
            .create_image_page(&sample_png(8, 8), Rotation::NONE)
            .expect("image page");

        let images = image_streams(&bytes);
        assert!(!images.is_empty());
        assert!(images.iter().all(|dict| !dict.has(b"SMask")));
    }

    #[test]
    fn undecodable_image_is_an_error() {
        let result = PdfWriter::new().create_image_page(b"not an image", Rotation::NONE);
        assert!(matches!(result, Err(PagewerkError::ImageError(_))));
    }
}
