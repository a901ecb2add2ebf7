use crate::error::GenesisError;
use image::imageops::FilterType;
use image::DynamicImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rwe_analysis::{KMeans, KMEANS_SEED};
use rwe_types::GenesisConfig;
use serde::{Deserialize, Serialize};

/// Side length of the thumbnail the palette is computed on.
pub const PALETTE_THUMB: u32 = 128;
/// Pixels sampled from the thumbnail for the palette fit.
pub const PALETTE_SAMPLE: usize = 8000;
/// Colours in the dominant palette.
pub const PALETTE_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// One palette entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantColor {
    pub rgb: [u8; 3],
    pub hex: String,
    /// Sampled pixels assigned to this colour.
    pub count: usize,
}

impl DominantColor {
    fn new(rgb: [u8; 3], count: usize) -> Self {
        Self {
            rgb,
            hex: format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]),
            count,
        }
    }
}

/// Contents of `genesis_analysis.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisAnalysis {
    pub source_url: String,
    pub local_path: String,
    pub size: ImageSize,
    pub aspect_ratio: f64,
    pub caption: String,
    pub keywords: Vec<String>,
    pub mean_color: [f64; 3],
    /// Mean Rec. 709 luma in `[0, 1]`.
    pub brightness: f64,
    /// Luma standard deviation in `[0, 1]`.
    pub contrast: f64,
    /// Most populated first.
    pub dominant_colors: Vec<DominantColor>,
    pub use_as_style: bool,
    pub style_strength: f64,
    pub style_iterations: u64,
}

impl GenesisAnalysis {
    pub fn hex_palette(&self) -> Vec<&str> {
        self.dominant_colors.iter().map(|c| c.hex.as_str()).collect()
    }
}

fn luma(p: &[u8; 3]) -> f64 {
    0.2126 * p[0] as f64 + 0.7152 * p[1] as f64 + 0.0722 * p[2] as f64
}

/// Summarise the genesis image alongside its caption and keywords.
pub fn analyze(
    image: &DynamicImage,
    caption: &str,
    keywords: &[String],
    source_url: &str,
    local_path: &str,
    genesis: &GenesisConfig,
) -> Result<GenesisAnalysis, GenesisError> {
    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();
    let n = (w as f64 * h as f64).max(1.0);

    let mut mean = [0.0f64; 3];
    let mut luma_sum = 0.0;
    for p in rgb.pixels() {
        for c in 0..3 {
            mean[c] += p.0[c] as f64;
        }
        luma_sum += luma(&p.0);
    }
    for m in mean.iter_mut() {
        *m /= n;
    }
    let luma_mean = luma_sum / n;
    let luma_var = rgb
        .pixels()
        .map(|p| (luma(&p.0) - luma_mean).powi(2))
        .sum::<f64>()
        / n;

    Ok(GenesisAnalysis {
        source_url: source_url.to_string(),
        local_path: local_path.to_string(),
        size: ImageSize {
            width: w,
            height: h,
        },
        aspect_ratio: w as f64 / h.max(1) as f64,
        caption: caption.to_string(),
        keywords: keywords.to_vec(),
        mean_color: mean,
        brightness: luma_mean / 255.0,
        contrast: luma_var.sqrt() / 255.0,
        dominant_colors: dominant_colors(image, PALETTE_SIZE)?,
        use_as_style: genesis.use_style,
        style_strength: genesis.style_strength,
        style_iterations: genesis.style_iterations,
    })
}

/// Up to `k` palette colours from a seeded k-means over a pixel sample of a
/// downscaled copy, most populated first.
pub fn dominant_colors(image: &DynamicImage, k: usize) -> Result<Vec<DominantColor>, GenesisError> {
    let thumb = image
        .resize_exact(PALETTE_THUMB, PALETTE_THUMB, FilterType::Triangle)
        .to_rgb8();
    let mut pixels: Vec<Vec<f64>> = thumb
        .pixels()
        .map(|p| p.0.iter().map(|v| *v as f64).collect())
        .collect();
    if pixels.len() > PALETTE_SAMPLE {
        let mut rng = StdRng::seed_from_u64(KMEANS_SEED);
        let picked = rand::seq::index::sample(&mut rng, pixels.len(), PALETTE_SAMPLE);
        pixels = picked.into_iter().map(|i| pixels[i].clone()).collect();
    }
    let k = k.min(pixels.len()).max(1);

    if k == 1 {
        let n = pixels.len().max(1) as f64;
        let mut mean = [0u8; 3];
        for (c, slot) in mean.iter_mut().enumerate() {
            *slot = (pixels.iter().map(|p| p[c]).sum::<f64>() / n) as u8;
        }
        return Ok(vec![DominantColor::new(mean, pixels.len())]);
    }

    let fit = KMeans::new(k).with_n_init(5).fit(&pixels)?;
    let counts = fit.counts();
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|a, b| counts[*b].cmp(&counts[*a]));
    Ok(order
        .into_iter()
        .map(|i| {
            let c = &fit.centroids[i];
            let rgb = [c[0] as u8, c[1] as u8, c[2] as u8];
            DominantColor::new(rgb, counts[i])
        })
        .collect())
}
