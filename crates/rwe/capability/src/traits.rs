use crate::error::CapabilityError;
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;

/// Seed image for an image-to-image call.
#[derive(Clone, Debug)]
pub struct InitImage {
    pub image: DynamicImage,
    /// How far the output may drift from the seed, in (0, 1].
    pub strength: f64,
}

/// Everything the generator needs for one artifact.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg: f64,
    pub seed: u64,
    pub init_image: Option<InitImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prompt: prompt.into(),
            negative: String::new(),
            width,
            height,
            steps: 22,
            cfg: 6.0,
            seed: 0,
            init_image: None,
        }
    }

    pub fn with_negative(mut self, negative: impl Into<String>) -> Self {
        self.negative = negative.into();
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_cfg(mut self, cfg: f64) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_init_image(mut self, image: DynamicImage, strength: f64) -> Self {
        self.init_image = Some(InitImage { image, strength });
        self
    }

    /// The same request as a plain text-to-image call.
    pub fn without_init_image(&self) -> Self {
        Self {
            init_image: None,
            ..self.clone()
        }
    }
}

/// Produces an image from a prompt and generation parameters.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Tag recorded in WorldState and every iteration record.
    fn backend_tag(&self) -> &str;

    /// Whether requests carrying an init image are honoured.
    fn supports_image_to_image(&self) -> bool {
        false
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<DynamicImage, CapabilityError>;
}

/// Describes an image in one short natural-language sentence.
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, image: &DynamicImage) -> Result<String, CapabilityError>;
}

/// Maps an image to a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, image: &DynamicImage) -> Result<Vec<f32>, CapabilityError>;
}

/// The three capabilities the engine consumes, behind shared handles.
#[derive(Clone)]
pub struct Capabilities {
    pub generator: Arc<dyn ImageGenerator>,
    pub captioner: Arc<dyn Captioner>,
    pub embedder: Arc<dyn Embedder>,
}

impl Capabilities {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        captioner: Arc<dyn Captioner>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            generator,
            captioner,
            embedder,
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("backend", &self.generator.backend_tag())
            .field("image_to_image", &self.generator.supports_image_to_image())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let req = GenerationRequest::new("open sky", 64, 32)
            .with_negative("blurry")
            .with_steps(30)
            .with_cfg(7.5)
            .with_seed(11);
        assert_eq!(req.prompt, "open sky");
        assert_eq!((req.width, req.height, req.steps, req.seed), (64, 32, 30, 11));
        assert_eq!(req.negative, "blurry");
        assert!(req.init_image.is_none());
    }

    #[test]
    fn strip_init_image_keeps_rest() {
        let img = DynamicImage::new_rgb8(4, 4);
        let req = GenerationRequest::new("p", 8, 8)
            .with_seed(3)
            .with_init_image(img, 0.55);
        let plain = req.without_init_image();
        assert!(plain.init_image.is_none());
        assert_eq!(plain.seed, 3);
        assert!(req.init_image.is_some());
    }
}
