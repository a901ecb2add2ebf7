/// Errors raised by generation, captioning and embedding capabilities.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("captioning failed: {0}")]
    Caption(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("backend {0} does not support image-to-image")]
    ImageToImageUnsupported(String),
    #[error("model service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid payload: {0}")]
    Payload(String),
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display() {
        let e = CapabilityError::Service {
            status: 503,
            message: "warming up".into(),
        };
        let s = format!("{}", e);
        assert!(s.contains("503") && s.contains("warming up"));
    }

    #[test]
    fn unsupported_names_backend() {
        let e = CapabilityError::ImageToImageUnsupported("sdxl_turbo".into());
        assert!(format!("{}", e).contains("sdxl_turbo"));
    }
}
