//! HTTP client for a remote model service exposing `/generate`, `/caption`
//! and `/embed`. Images travel as base64-encoded PNG.

use crate::error::CapabilityError;
use crate::traits::{Capabilities, Captioner, Embedder, GenerationRequest, ImageGenerator};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageOutputFormat};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    steps: u32,
    guidance_scale: f64,
    width: u32,
    height: u32,
    seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    init_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strength: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ImageBody {
    image: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    image: String,
}

#[derive(Debug, Deserialize)]
struct CaptionResponse {
    caption: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Encode an image as base64 PNG.
pub fn encode_png(image: &DynamicImage) -> Result<String, CapabilityError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageOutputFormat::Png)?;
    Ok(STANDARD.encode(buf.into_inner()))
}

/// Decode a base64 payload into an image.
pub fn decode_image(payload: &str) -> Result<DynamicImage, CapabilityError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CapabilityError::Payload(format!("bad base64: {}", e)))?;
    Ok(image::load_from_memory(&bytes)?)
}

/// One client serving all three capabilities.
#[derive(Clone, Debug)]
pub struct HttpModelService {
    client: Client,
    base_url: String,
    backend: String,
    image_to_image: bool,
}

impl HttpModelService {
    pub fn new(endpoint: &str) -> Result<Self, CapabilityError> {
        let client = Client::builder().timeout(Duration::from_secs(300)).build()?;
        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            backend: "remote".into(),
            image_to_image: true,
        })
    }

    pub fn with_backend(mut self, tag: impl Into<String>) -> Self {
        self.backend = tag.into();
        self
    }

    pub fn with_image_to_image(mut self, supported: bool) -> Self {
        self.image_to_image = supported;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CapabilityError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "model service request");
        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CapabilityError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(CapabilityError::Service {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl Capabilities {
    /// All three capabilities served by one remote model service.
    pub fn remote(service: HttpModelService) -> Self {
        let shared = Arc::new(service);
        Self::new(shared.clone(), shared.clone(), shared)
    }
}

#[async_trait]
impl ImageGenerator for HttpModelService {
    fn backend_tag(&self) -> &str {
        &self.backend
    }

    fn supports_image_to_image(&self) -> bool {
        self.image_to_image
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<DynamicImage, CapabilityError> {
        let (init_image, strength) = match &request.init_image {
            Some(_) if !self.image_to_image => {
                return Err(CapabilityError::ImageToImageUnsupported(self.backend.clone()))
            }
            Some(init) => (Some(encode_png(&init.image)?), Some(init.strength)),
            None => (None, None),
        };
        let body = GenerateBody {
            prompt: &request.prompt,
            negative_prompt: &request.negative,
            steps: request.steps,
            guidance_scale: request.cfg,
            width: request.width,
            height: request.height,
            seed: request.seed,
            init_image,
            strength,
        };
        let response: GenerateResponse = self.post("/generate", &body).await?;
        decode_image(&response.image)
    }
}

#[async_trait]
impl Captioner for HttpModelService {
    async fn caption(&self, image: &DynamicImage) -> Result<String, CapabilityError> {
        let body = ImageBody {
            image: encode_png(image)?,
        };
        let response: CaptionResponse = self.post("/caption", &body).await?;
        Ok(response.caption.trim().to_string())
    }
}

#[async_trait]
impl Embedder for HttpModelService {
    async fn embed(&self, image: &DynamicImage) -> Result<Vec<f32>, CapabilityError> {
        let body = ImageBody {
            image: encode_png(image)?,
        };
        let response: EmbedResponse = self.post("/embed", &body).await?;
        if response.embedding.is_empty() {
            return Err(CapabilityError::Embedding("service returned an empty vector".into()));
        }
        Ok(response.embedding)
    }
}
