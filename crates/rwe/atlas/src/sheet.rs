use crate::error::AtlasError;
use image::imageops;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Height of the title band above the grid.
pub const HEADER_HEIGHT: u32 = 96;
const TITLE_SCALE: f32 = 28.0;
const COUNT_SCALE: f32 = 18.0;

/// TrueType files tried in order when no font is configured.
const SYSTEM_FONTS: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn load_font(path: &Path) -> Result<Font<'static>, AtlasError> {
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes).ok_or_else(|| AtlasError::Font(path.display().to_string()))
}

fn system_font() -> Option<Font<'static>> {
    let font = SYSTEM_FONTS
        .iter()
        .find_map(|p| load_font(Path::new(p)).ok());
    if font.is_none() {
        warn!("no system font found, contact sheet headers stay blank");
    }
    font
}

/// Grid layout for contact sheets.
///
/// A header band carries the sheet title and image count. Below it every
/// image is downscaled into a square white cell of `thumb` pixels,
/// preserving aspect ratio, and cells are laid out row-major in `cols`
/// columns separated by `padding`.
#[derive(Clone)]
pub struct ContactSheet {
    thumb: u32,
    cols: u32,
    padding: u32,
    header: u32,
    background: Rgb<u8>,
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for ContactSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactSheet")
            .field("thumb", &self.thumb)
            .field("cols", &self.cols)
            .field("padding", &self.padding)
            .field("header", &self.header)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl ContactSheet {
    /// Default layout, titled with the first system font that loads.
    pub fn new() -> Self {
        Self {
            font: system_font(),
            ..Self::untitled()
        }
    }

    /// Default layout without a font; the header band is left blank.
    pub fn untitled() -> Self {
        Self {
            thumb: 320,
            cols: 3,
            padding: 18,
            header: HEADER_HEIGHT,
            background: Rgb([245, 245, 245]),
            font: None,
        }
    }

    /// Use the TrueType font at `path` for headers.
    pub fn with_font(mut self, path: &Path) -> Result<Self, AtlasError> {
        self.font = Some(load_font(path)?);
        Ok(self)
    }

    pub fn with_thumb(mut self, thumb: u32) -> Self {
        self.thumb = thumb.max(1);
        self
    }

    pub fn with_columns(mut self, cols: u32) -> Self {
        self.cols = cols.max(1);
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_header(mut self, header: u32) -> Self {
        self.header = header;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Canvas size for `count` cells.
    pub fn dimensions(&self, count: usize) -> (u32, u32) {
        let count = count.max(1) as u32;
        let cols = self.cols.min(count);
        let rows = count.div_ceil(self.cols);
        let pitch = self.thumb + self.padding;
        (
            self.padding + cols * pitch,
            self.header + self.padding + rows * pitch,
        )
    }

    /// Compose already-loaded images under a `title` header.
    pub fn compose(&self, images: &[DynamicImage], title: &str) -> RgbImage {
        let (w, h) = self.dimensions(images.len());
        let mut canvas = RgbImage::from_pixel(w, h, self.background);
        self.draw_header(&mut canvas, title, images.len());
        let pitch = self.thumb + self.padding;
        for (i, img) in images.iter().enumerate() {
            let i = i as u32;
            let cell_x = self.padding + (i % self.cols) * pitch;
            let cell_y = self.header + self.padding + (i / self.cols) * pitch;
            let mut cell = RgbImage::from_pixel(self.thumb, self.thumb, Rgb([255, 255, 255]));
            let thumb = img.thumbnail(self.thumb, self.thumb).to_rgb8();
            let ox = (self.thumb - thumb.width()) / 2;
            let oy = (self.thumb - thumb.height()) / 2;
            imageops::overlay(&mut cell, &thumb, ox as i64, oy as i64);
            imageops::overlay(&mut canvas, &cell, cell_x as i64, cell_y as i64);
        }
        canvas
    }

    fn draw_header(&self, canvas: &mut RgbImage, title: &str, count: usize) {
        let Some(font) = &self.font else {
            return;
        };
        if self.header < 2 * 18 + COUNT_SCALE as u32 {
            return;
        }
        let x = self.padding as i32;
        draw_text_mut(canvas, Rgb([0, 0, 0]), x, 18, Scale::uniform(TITLE_SCALE), font, title);
        let n = format!("n={}", count);
        draw_text_mut(canvas, Rgb([30, 30, 30]), x, 58, Scale::uniform(COUNT_SCALE), font, &n);
    }

    /// Load `paths`, skip unreadable ones, and write the titled sheet to
    /// `out` as PNG. Returns how many images made it onto the sheet.
    pub fn render(&self, paths: &[PathBuf], title: &str, out: &Path) -> Result<usize, AtlasError> {
        let images: Vec<DynamicImage> = paths
            .iter()
            .filter_map(|p| match image::open(p) {
                Ok(img) => Some(img),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "skipping unreadable image");
                    None
                }
            })
            .collect();
        if images.is_empty() {
            return Err(AtlasError::NoImages(out.display().to_string()));
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.compose(&images, title).save(out)?;
        debug!(path = %out.display(), title, images = images.len(), "contact sheet written");
        Ok(images.len())
    }
}

impl Default for ContactSheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, c: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(c)))
    }

    fn header_has_ink(sheet: &RgbImage, header: u32) -> bool {
        (0..header).any(|y| (0..sheet.width()).any(|x| sheet.get_pixel(x, y).0[0] < 128))
    }

    #[test]
    fn dimensions_follow_grid() {
        let s = ContactSheet::untitled();
        assert_eq!(s.dimensions(1), (18 + 338, 96 + 18 + 338));
        assert_eq!(s.dimensions(3), (18 + 3 * 338, 96 + 18 + 338));
        assert_eq!(s.dimensions(7), (18 + 3 * 338, 96 + 18 + 3 * 338));
    }

    #[test]
    fn thumbnails_are_centered_in_white_cells() {
        let s = ContactSheet::untitled()
            .with_thumb(10)
            .with_padding(2)
            .with_columns(2)
            .with_header(0);
        let sheet = s.compose(&[solid(20, 10, [200, 0, 0]), solid(10, 10, [0, 0, 200])], "t");
        assert_eq!(sheet.dimensions(), (2 + 2 * 12, 2 + 12));
        // wide image: 10x5 thumbnail centered vertically in a 10x10 cell
        assert_eq!(sheet.get_pixel(2 + 5, 2 + 1), &Rgb([255, 255, 255]));
        assert_eq!(sheet.get_pixel(2 + 5, 2 + 5), &Rgb([200, 0, 0]));
        assert_eq!(sheet.get_pixel(14 + 5, 2 + 5), &Rgb([0, 0, 200]));
        assert_eq!(sheet.get_pixel(0, 0), &Rgb([245, 245, 245]));
    }

    #[test]
    fn grid_starts_below_header() {
        let s = ContactSheet::untitled().with_thumb(10).with_padding(2);
        let sheet = s.compose(&[solid(10, 10, [0, 150, 0])], "Epoch 01");
        assert_eq!(sheet.get_pixel(2 + 5, HEADER_HEIGHT + 2 + 5), &Rgb([0, 150, 0]));
        assert_eq!(sheet.get_pixel(7, HEADER_HEIGHT / 2), &Rgb([245, 245, 245]));
        assert!(!header_has_ink(&sheet, HEADER_HEIGHT));
    }

    #[test]
    fn header_text_is_drawn_with_a_font() {
        let sheet = ContactSheet::new();
        if !sheet.has_font() {
            return;
        }
        let img = sheet.compose(&[solid(8, 8, [250, 250, 250])], "Cluster 00 (top 1)");
        assert!(header_has_ink(&img, HEADER_HEIGHT));
    }

    #[test]
    fn bad_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let err = ContactSheet::untitled().with_font(&path).unwrap_err();
        assert!(matches!(err, AtlasError::Font(_)));
    }

    #[test]
    fn render_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        solid(8, 8, [1, 2, 3]).save(&good).unwrap();
        let bad = dir.path().join("missing.png");
        let out = dir.path().join("sheets/sheet.png");
        let n = ContactSheet::untitled()
            .render(&[good, bad], "Timeline", &out)
            .unwrap();
        assert_eq!(n, 1);
        let written = image::open(&out).unwrap();
        assert_eq!(written.height(), HEADER_HEIGHT + 18 + 338);
    }

    #[test]
    fn render_without_images_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContactSheet::untitled()
            .render(&[dir.path().join("nope.png")], "x", &dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, AtlasError::NoImages(_)));
    }
}
