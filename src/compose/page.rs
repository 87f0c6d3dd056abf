//! Composition of a single two-column book page.

use std::path::Path;

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::error::{Error, Result};
use crate::layout::{layout_text, FontMetrics, LayoutBlock};
use crate::plan::Page;
use crate::store::ArtifactStore;

use super::geometry::{PageGeometry, Rect};
use super::raster::ImageXObject;

/// Resource name of the body font.
pub const FONT_RESOURCE: &str = "F1";

/// Resource name of the page illustration.
pub const IMAGE_RESOURCE: &str = "Im1";

/// Bezier control distance for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// Drawing operations and resources for one physical page.
#[derive(Debug, Clone)]
pub struct ComposedPage {
    /// Page number in the plan
    pub number: u32,
    /// Content stream operations
    pub operations: Vec<Operation>,
    /// Illustration drawn in the left column
    pub image: ImageXObject,
    /// Where the illustration was placed
    pub image_rect: Rect,
    /// Text block drawn in the right column
    pub text: LayoutBlock,
}

/// Lays out one page: illustration on the left, text panel on the right.
pub struct PageComposer<'a> {
    geometry: &'a PageGeometry,
    metrics: &'a dyn FontMetrics,
}

impl<'a> PageComposer<'a> {
    /// Create a composer.
    pub fn new(geometry: &'a PageGeometry, metrics: &'a dyn FontMetrics) -> Self {
        Self { geometry, metrics }
    }

    /// Compose `page` using the image stored at `image_path`.
    ///
    /// Text that does not fit the panel is truncated, so long text never
    /// fails composition. A missing image does.
    pub fn compose(
        &self,
        page: &Page,
        total: usize,
        store: &dyn ArtifactStore,
        image_path: &Path,
    ) -> Result<ComposedPage> {
        if !store.exists(image_path) {
            return Err(Error::MissingArtifact(image_path.to_path_buf()));
        }
        let image = ImageXObject::decode(&store.read(image_path)?)?;
        Ok(self.compose_with_image(page, total, image))
    }

    /// Compose `page` with an already decoded image.
    pub fn compose_with_image(&self, page: &Page, total: usize, image: ImageXObject) -> ComposedPage {
        let g = self.geometry;
        let mut ops = Vec::new();

        // Text panel background.
        let panel = g.text_column();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("g", vec![1.0f32.into()]));
        rounded_rect(&mut ops, &panel, g.panel_radius);
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));

        // Illustration, fit inside the left column.
        let image_rect = g
            .image_column()
            .fit(image.width as f32, image.height as f32);
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                image_rect.width.into(),
                0.into(),
                0.into(),
                image_rect.height.into(),
                image_rect.x.into(),
                image_rect.y.into(),
            ],
        ));
        ops.push(Operation::new("Do", vec![IMAGE_RESOURCE.into()]));
        ops.push(Operation::new("Q", vec![]));

        // Body text, each line centered horizontally.
        let text_box = g.text_box();
        let block = layout_text(
            page.printed_text(),
            &text_box,
            g.font_size,
            g.leading,
            self.metrics,
        );
        if !block.is_empty() {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("g", vec![0.0f32.into()]));
            ops.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), g.font_size.into()],
            ));
            for (line, y) in block.baselines() {
                let width = self.metrics.string_width(line, g.font_size);
                show_text_at(&mut ops, line, text_box.center_x - width / 2.0, y);
            }
            ops.push(Operation::new("ET", vec![]));
        }

        // Page number footer, right-aligned.
        let footer = format!("{}/{}", page.number, total);
        let (right, baseline) = g.footer_anchor();
        let footer_width = self.metrics.string_width(&footer, g.footer_size);
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("g", vec![g.footer_gray.into()]));
        ops.push(Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), g.footer_size.into()],
        ));
        show_text_at(&mut ops, &footer, right - footer_width, baseline);
        ops.push(Operation::new("ET", vec![]));

        log::debug!(
            "Composed page {} ({} text lines)",
            page.number,
            block.lines.len()
        );

        ComposedPage {
            number: page.number,
            operations: ops,
            image,
            image_rect,
            text: block,
        }
    }
}

/// Encode text for the UTF-16 CID font as a hex string operand.
pub fn encode_text(text: &str) -> Object {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn show_text_at(ops: &mut Vec<Operation>, text: &str, x: f32, y: f32) {
    ops.push(Operation::new(
        "Tm",
        vec![
            1.into(),
            0.into(),
            0.into(),
            1.into(),
            x.into(),
            y.into(),
        ],
    ));
    ops.push(Operation::new("Tj", vec![encode_text(text)]));
}

fn rounded_rect(ops: &mut Vec<Operation>, rect: &Rect, radius: f32) {
    let r = radius.clamp(0.0, rect.width.min(rect.height) / 2.0);
    let k = r * KAPPA;
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);

    let mut point = |op: &str, coords: &[f32]| {
        ops.push(Operation::new(
            op,
            coords.iter().map(|&c| Object::Real(c)).collect(),
        ));
    };

    point("m", &[x + r, y]);
    point("l", &[x + w - r, y]);
    point("c", &[x + w - r + k, y, x + w, y + r - k, x + w, y + r]);
    point("l", &[x + w, y + h - r]);
    point("c", &[x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h]);
    point("l", &[x + r, y + h]);
    point("c", &[x + r - k, y + h, x, y + h - r + k, x, y + h - r]);
    point("l", &[x, y + r]);
    point("c", &[x, y + r - k, x + r - k, y, x + r, y]);
    point("h", &[]);
}
