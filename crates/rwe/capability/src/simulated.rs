//! Deterministic in-process capabilities for offline runs and tests.

use crate::error::CapabilityError;
use crate::traits::{Capabilities, Captioner, Embedder, GenerationRequest, ImageGenerator};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Side length of the grid the simulated embedder samples.
pub const SIMULATED_GRID: u32 = 4;

pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        h ^= *b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

fn random_color<R: Rng>(rng: &mut R) -> [u8; 3] {
    [rng.gen(), rng.gen(), rng.gen()]
}

fn mix(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 * (1.0 - t) + b as f64 * t).round().clamp(0.0, 255.0) as u8
}

/// Paints a gradient plus one disc per prompt clause, seeded by prompt and seed.
#[derive(Clone, Debug)]
pub struct SimulatedGenerator {
    backend: String,
    image_to_image: bool,
    fail_image_to_image: bool,
}

impl SimulatedGenerator {
    pub fn new() -> Self {
        Self {
            backend: "simulated".into(),
            image_to_image: true,
            fail_image_to_image: false,
        }
    }

    pub fn with_backend(mut self, tag: impl Into<String>) -> Self {
        self.backend = tag.into();
        self
    }

    pub fn with_image_to_image(mut self, supported: bool) -> Self {
        self.image_to_image = supported;
        self
    }

    /// Advertise image-to-image but reject every request carrying an init image.
    pub fn with_failing_image_to_image(mut self) -> Self {
        self.image_to_image = true;
        self.fail_image_to_image = true;
        self
    }

    fn render(&self, request: &GenerationRequest) -> RgbImage {
        let (w, h) = (request.width, request.height);
        let mut rng = StdRng::seed_from_u64(fnv1a(request.prompt.as_bytes()) ^ request.seed);
        let top = random_color(&mut rng);
        let bottom = random_color(&mut rng);
        let mut img = RgbImage::from_fn(w, h, |_, y| {
            let t = y as f64 / h.max(1) as f64;
            Rgb([mix(top[0], bottom[0], t), mix(top[1], bottom[1], t), mix(top[2], bottom[2], t)])
        });

        let side = w.min(h);
        for clause in request.prompt.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let mut crng =
                StdRng::seed_from_u64(fnv1a(clause.as_bytes()) ^ request.seed.rotate_left(17));
            let color = random_color(&mut crng);
            let cx = crng.gen_range(0..w) as i64;
            let cy = crng.gen_range(0..h) as i64;
            let r = crng.gen_range(side / 10..=side / 3).max(1) as i64;
            for y in (cy - r).max(0)..(cy + r).min(h as i64) {
                for x in (cx - r).max(0)..(cx + r).min(w as i64) {
                    if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                        img.put_pixel(x as u32, y as u32, Rgb(color));
                    }
                }
            }
        }

        if let Some(init) = &request.init_image {
            let seed = init.image.resize_exact(w, h, FilterType::Triangle).to_rgb8();
            let t = init.strength.clamp(0.0, 1.0);
            for (px, sp) in img.pixels_mut().zip(seed.pixels()) {
                for c in 0..3 {
                    px.0[c] = mix(sp.0[c], px.0[c], t);
                }
            }
        }
        img
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerator for SimulatedGenerator {
    fn backend_tag(&self) -> &str {
        &self.backend
    }

    fn supports_image_to_image(&self) -> bool {
        self.image_to_image
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<DynamicImage, CapabilityError> {
        if request.width == 0 || request.height == 0 {
            return Err(CapabilityError::Generation(format!(
                "invalid dimensions {}x{}",
                request.width, request.height
            )));
        }
        if request.init_image.is_some() {
            if !self.image_to_image {
                return Err(CapabilityError::ImageToImageUnsupported(self.backend.clone()));
            }
            if self.fail_image_to_image {
                return Err(CapabilityError::Generation("simulated img2img failure".into()));
            }
        }
        Ok(DynamicImage::ImageRgb8(self.render(request)))
    }
}

const SCENE_NOUNS: [&str; 16] = [
    "lighthouse", "meadow", "canyon", "harbor", "forest", "glacier", "orchard", "ruins",
    "lagoon", "dunes", "bridge", "waterfall", "observatory", "reef", "plateau", "marsh",
];

const TONES: [(&str, [u8; 3]); 8] = [
    ("crimson", [200, 40, 40]),
    ("amber", [220, 160, 40]),
    ("olive", [110, 130, 50]),
    ("emerald", [40, 170, 90]),
    ("teal", [40, 140, 150]),
    ("cobalt", [40, 70, 190]),
    ("violet", [130, 60, 170]),
    ("slate", [110, 115, 125]),
];

/// Captions derived from image statistics, or replayed from a script.
#[derive(Debug, Default)]
pub struct SimulatedCaptioner {
    script: Vec<String>,
    cursor: AtomicUsize,
}

impl SimulatedCaptioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the given captions in order, cycling when exhausted.
    pub fn with_script(mut self, captions: Vec<String>) -> Self {
        self.script = captions;
        self
    }

    fn describe(image: &DynamicImage) -> String {
        let thumb = image.resize_exact(8, 8, FilterType::Triangle).to_rgb8();
        let n = (thumb.width() * thumb.height()).max(1) as f64;
        let mut mean = [0.0f64; 3];
        for p in thumb.pixels() {
            for c in 0..3 {
                mean[c] += p.0[c] as f64 / n;
            }
        }
        let tone = TONES
            .iter()
            .min_by(|a, b| {
                let da: f64 = (0..3).map(|c| (a.1[c] as f64 - mean[c]).powi(2)).sum();
                let db: f64 = (0..3).map(|c| (b.1[c] as f64 - mean[c]).powi(2)).sum();
                da.total_cmp(&db)
            })
            .map(|t| t.0)
            .unwrap_or("grey");
        let brightness = (mean[0] + mean[1] + mean[2]) / 3.0;
        let light = if brightness > 150.0 {
            "bright daylight"
        } else if brightness > 80.0 {
            "soft dusk light"
        } else {
            "deep night"
        };
        let h = fnv1a(thumb.as_raw());
        let first = SCENE_NOUNS[(h % SCENE_NOUNS.len() as u64) as usize];
        let second = SCENE_NOUNS[((h >> 16) % SCENE_NOUNS.len() as u64) as usize];
        if first == second {
            format!("a {} {} under {}", tone, first, light)
        } else {
            format!("a {} {} beside a {} under {}", tone, first, second, light)
        }
    }
}

#[async_trait]
impl Captioner for SimulatedCaptioner {
    async fn caption(&self, image: &DynamicImage) -> Result<String, CapabilityError> {
        if self.script.is_empty() {
            return Ok(Self::describe(image));
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(self.script[i % self.script.len()].clone())
    }
}

/// Mean-centred colour grid of the image, or replayed vectors from a script.
#[derive(Debug, Default)]
pub struct SimulatedEmbedder {
    script: Vec<Vec<f32>>,
    cursor: AtomicUsize,
}

impl SimulatedEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the given vectors in order, cycling when exhausted.
    pub fn with_script(mut self, vectors: Vec<Vec<f32>>) -> Self {
        self.script = vectors;
        self
    }

    /// Dimensionality of non-scripted embeddings.
    pub fn dimension() -> usize {
        (SIMULATED_GRID * SIMULATED_GRID * 3) as usize
    }

    fn features(image: &DynamicImage) -> Vec<f32> {
        let grid = image
            .resize_exact(SIMULATED_GRID, SIMULATED_GRID, FilterType::Triangle)
            .to_rgb8();
        let raw: Vec<f32> = grid.as_raw().iter().map(|v| *v as f32 / 255.0).collect();
        let mean = raw.iter().sum::<f32>() / raw.len().max(1) as f32;
        raw.into_iter().map(|v| v - mean).collect()
    }
}

#[async_trait]
impl Embedder for SimulatedEmbedder {
    async fn embed(&self, image: &DynamicImage) -> Result<Vec<f32>, CapabilityError> {
        if self.script.is_empty() {
            return Ok(Self::features(image));
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(self.script[i % self.script.len()].clone())
    }
}

impl Capabilities {
    /// Fully in-process capability set.
    pub fn simulated() -> Self {
        Self::new(
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedCaptioner::new()),
            Arc::new(SimulatedEmbedder::new()),
        )
    }
}

/// Generator that always fails.
pub struct FailingGenerator;

#[async_trait]
impl ImageGenerator for FailingGenerator {
    fn backend_tag(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<DynamicImage, CapabilityError> {
        Err(CapabilityError::Generation("simulated generator failure".into()))
    }
}

/// Captioner that always fails.
pub struct FailingCaptioner;

#[async_trait]
impl Captioner for FailingCaptioner {
    async fn caption(&self, _image: &DynamicImage) -> Result<String, CapabilityError> {
        Err(CapabilityError::Caption("simulated captioner failure".into()))
    }
}

/// Embedder that always fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _image: &DynamicImage) -> Result<Vec<f32>, CapabilityError> {
        Err(CapabilityError::Embedding("simulated embedder failure".into()))
    }
}
