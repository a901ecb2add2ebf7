use crate::error::AtlasError;
use image::DynamicImage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// A4 portrait, millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 15.0;

const PT: f32 = 25.4 / 72.0;
const TEXT_FLOOR_MM: f32 = 30.0;
const LINE_STEP_PT: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;

/// One logical page of the atlas. Text pages flow onto continuation pages
/// when their lines run past the bottom margin.
#[derive(Clone, Debug, PartialEq)]
pub enum AtlasPage {
    Cover { title: String, lines: Vec<String> },
    Text { title: String, lines: Vec<String> },
    Sheet { title: String, image: PathBuf },
}

impl AtlasPage {
    pub fn title(&self) -> &str {
        match self {
            AtlasPage::Cover { title, .. }
            | AtlasPage::Text { title, .. }
            | AtlasPage::Sheet { title, .. } => title,
        }
    }
}

fn pdf_err(e: impl std::fmt::Debug) -> AtlasError {
    AtlasError::Pdf(format!("{:?}", e))
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
    fresh: bool,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, AtlasError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            pages: 1,
            fresh: true,
        })
    }

    /// The document starts with one blank page; later calls append pages.
    fn begin_page(&mut self) {
        if self.fresh {
            self.fresh = false;
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    fn text(&self, text: &str, size: f32, bold: bool, x: f32, y: f32) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn cover(&mut self, title: &str, lines: &[String]) {
        self.begin_page();
        self.text(title, 22.0, true, MARGIN_MM, PAGE_HEIGHT_MM - 30.0);
        let mut y = PAGE_HEIGHT_MM - 40.0;
        for line in lines {
            self.text(line, 12.0, false, MARGIN_MM, y);
            y -= 8.0;
        }
    }

    fn text_page(&mut self, title: &str, lines: &[String]) {
        self.begin_page();
        self.text(title, 16.0, true, MARGIN_MM, PAGE_HEIGHT_MM - MARGIN_MM);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM - 18.0 * PT;
        for line in lines {
            if y < TEXT_FLOOR_MM {
                self.begin_page();
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            self.text(line, BODY_SIZE, false, MARGIN_MM, y);
            y -= LINE_STEP_PT * PT;
        }
    }

    fn sheet_page(&mut self, title: &str, path: &Path) -> Result<(), AtlasError> {
        let img = image::open(path)?;
        self.begin_page();
        self.text(title, 14.0, true, MARGIN_MM, PAGE_HEIGHT_MM - MARGIN_MM);

        let (box_w, box_h) = image_box();
        let (px_w, px_h) = (img.width().max(1) as f32, img.height().max(1) as f32);
        let dpi = (px_w * 25.4 / box_w).max(px_h * 25.4 / box_h);
        let (w, h) = (px_w * 25.4 / dpi, px_h * 25.4 / dpi);
        let transform = ImageTransform {
            translate_x: Some(Mm(MARGIN_MM + (box_w - w) / 2.0)),
            translate_y: Some(Mm(MARGIN_MM + (box_h - h) / 2.0)),
            dpi: Some(dpi),
            ..Default::default()
        };
        let flat = DynamicImage::ImageRgb8(img.to_rgb8());
        Image::from_dynamic_image(&flat).add_to_layer(self.layer.clone(), transform);
        Ok(())
    }

    fn save(self, out: &Path) -> Result<usize, AtlasError> {
        let pages = self.pages;
        let mut writer = BufWriter::new(File::create(out)?);
        self.doc.save(&mut writer).map_err(pdf_err)?;
        Ok(pages)
    }
}

/// Area available to a contact sheet below its page title, in millimetres.
pub fn image_box() -> (f32, f32) {
    (
        PAGE_WIDTH_MM - 2.0 * MARGIN_MM,
        PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - 18.0 * PT,
    )
}

/// Physical pages a text page occupies once its lines overflow.
pub fn text_page_count(lines: usize) -> usize {
    let first = PAGE_HEIGHT_MM - MARGIN_MM - 18.0 * PT;
    let per_page = |top: f32| (((top - TEXT_FLOOR_MM) / (LINE_STEP_PT * PT)).floor() as usize) + 1;
    let on_first = per_page(first);
    if lines <= on_first {
        return 1;
    }
    1 + (lines - on_first).div_ceil(per_page(PAGE_HEIGHT_MM - MARGIN_MM))
}

/// Render `pages` into a single PDF at `out`; returns the physical page count.
pub fn write_pdf(doc_title: &str, pages: &[AtlasPage], out: &Path) -> Result<usize, AtlasError> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut canvas = Canvas::new(doc_title)?;
    for page in pages {
        match page {
            AtlasPage::Cover { title, lines } => canvas.cover(title, lines),
            AtlasPage::Text { title, lines } => canvas.text_page(title, lines),
            AtlasPage::Sheet { title, image } => canvas.sheet_page(title, image)?,
        }
    }
    canvas.save(out)
}
