use crate::error::Result;
use crate::io::atomic_write;
use crate::types::Profession;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::path::Path;

/// Suggested name for the downloaded plan, e.g. `plano-dentista.jpg`.
pub fn download_filename(profession: Profession) -> String {
    format!("plano-{}.jpg", profession.slug())
}

/// Encode the summary as JPEG. `quality` is clamped to 1..=100.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(img)?;
    Ok(bytes)
}

pub fn write_jpeg(img: &RgbImage, quality: u8, path: &Path) -> Result<()> {
    let bytes = encode_jpeg(img, quality)?;
    atomic_write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "summary exported");
    Ok(())
}
