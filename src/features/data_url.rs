use crate::features::error::DataUrlError;
use base64::{Engine as _, engine::general_purpose};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;

const JPEG_QUALITY: u8 = 80;

/// Shrinks a photo to fit `max_dimension` on its longest side and returns it
/// as a JPEG `data:` URL, ready to attach to a vision request.
pub fn bytes_to_data_url(bytes: &[u8], max_dimension: u32) -> Result<String, DataUrlError> {
    let img = image::load_from_memory(bytes)?;
    let thumbnail = if img.width() > max_dimension || img.height() > max_dimension {
        img.thumbnail(max_dimension, max_dimension)
    } else {
        img
    };
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(thumbnail.to_rgb8());

    let mut bytes = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))?;
    let b64 = general_purpose::STANDARD.encode(bytes.into_inner());
    Ok(format!("data:image/jpeg;base64,{b64}"))
}
