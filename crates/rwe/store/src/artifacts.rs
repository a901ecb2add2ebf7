use crate::error::StoreError;
use crate::state::write_json_atomic;
use image::DynamicImage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Save an image as PNG, creating parent directories.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Open any supported image format.
pub fn load_image(path: &Path) -> Result<DynamicImage, StoreError> {
    Ok(image::open(path)?)
}

/// Write an embedding as raw little-endian f32.
pub fn write_embedding(path: &Path, vector: &[f32]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let bytes: Vec<u8> = vector.iter().flat_map(|v| v.to_le_bytes()).collect();
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a raw little-endian f32 embedding; dimensionality follows the file length.
pub fn read_embedding(path: &Path) -> Result<Vec<f32>, StoreError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(StoreError::CorruptEmbedding {
            path: path.to_path_buf(),
            len: bytes.len() as u64,
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write a derived JSON artifact (cluster report, epochs, genesis analysis).
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    write_json_atomic(path, value)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
