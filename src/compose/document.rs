//! Assembly of all pages into one PDF document.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::config::ProjectLayout;
use crate::error::Result;
use crate::layout::{CidFontMetrics, FontMetrics};
use crate::plan::BookPlan;
use crate::store::ArtifactStore;

use super::geometry::PageGeometry;
use super::page::{PageComposer, FONT_RESOURCE, IMAGE_RESOURCE};

/// Builds the book PDF from a plan and its page images.
pub struct DocumentAssembler {
    geometry: PageGeometry,
    metrics: Box<dyn FontMetrics>,
}

impl DocumentAssembler {
    /// Create an assembler with the default geometry and the built-in
    /// Japanese font.
    pub fn new() -> Self {
        Self {
            geometry: PageGeometry::default(),
            metrics: Box::new(CidFontMetrics),
        }
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the font metrics used for measuring text.
    pub fn with_metrics(mut self, metrics: Box<dyn FontMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The page geometry.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Compose every page of `plan` and return the PDF bytes.
    ///
    /// Pages are emitted in plan order, one physical page per plan page.
    /// The first page that fails to compose aborts assembly.
    pub fn assemble(
        &self,
        plan: &BookPlan,
        store: &dyn ArtifactStore,
        pages_dir: &Path,
    ) -> Result<Vec<u8>> {
        let composer = PageComposer::new(&self.geometry, self.metrics.as_ref());
        let total = plan.page_count();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = add_cid_font(&mut doc);

        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for page in &plan.pages {
            let image_path = pages_dir.join(page.image_name());
            let composed = composer.compose(page, total, store, &image_path)?;

            let image_id = composed.image.embed(&mut doc)?;
            let content = Content {
                operations: composed.operations,
            };
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { FONT_RESOURCE => font_id },
                    "XObject" => dictionary! { IMAGE_RESOURCE => image_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.geometry.page_width.into(),
            self.geometry.page_height.into(),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(plan.display_title()),
            "Producer" => Object::string_literal(concat!("storyshelf ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        doc.compress();
        let mut out = Vec::new();
        doc.save_to(&mut out)?;

        log::info!("Assembled {} pages ({} bytes)", count, out.len());
        Ok(out)
    }

    /// Assemble `plan` from `layout.pages_dir` and write `layout.document`.
    ///
    /// Nothing is written unless every page composes.
    pub fn write_document(
        &self,
        plan: &BookPlan,
        store: &dyn ArtifactStore,
        layout: &ProjectLayout,
    ) -> Result<usize> {
        let bytes = self.assemble(plan, store, &layout.pages_dir)?;
        store.write(&layout.document, &bytes)?;
        log::info!("PDF saved: {}", layout.document.display());
        Ok(plan.page_count())
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a PDF text string (UTF-16BE with byte order mark).
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xfe, 0xff];
    bytes.extend(text.encode_utf16().flat_map(|u| u.to_be_bytes()));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Add the non-embedded Japanese Type0 font and return its object id.
fn add_cid_font(doc: &mut Document) -> ObjectId {
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => CidFontMetrics::BASE_FONT,
        "Flags" => 4,
        "FontBBox" => [-92, -250, 1010, 922].map(Object::Integer).to_vec(),
        "ItalicAngle" => 0,
        "Ascent" => 752,
        "Descent" => -221,
        "CapHeight" => 737,
        "StemV" => 114,
    });

    let widths: Vec<Object> = CidFontMetrics::pdf_widths()
        .iter()
        .flat_map(|&(first, last, width)| {
            [
                Object::Integer(first),
                Object::Integer(last),
                Object::Integer(width),
            ]
        })
        .collect();

    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => CidFontMetrics::BASE_FONT,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => 2,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => widths,
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => format!("{}-{}", CidFontMetrics::BASE_FONT, CidFontMetrics::ENCODING),
        "Encoding" => CidFontMetrics::ENCODING,
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
    })
}
