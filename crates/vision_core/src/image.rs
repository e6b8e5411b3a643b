//! Uploaded image handling.
//!
//! Uploads are decoded once and re-encoded as PNG so every request embeds the same
//! `data:image/png;base64,` URI regardless of the uploaded file format.

use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;

use crate::error::{Result, StoreError};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// An image bound to a conversation. Cheap to clone; the PNG bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    name: String,
    png: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl ImageAttachment {
    /// Decode raw upload bytes and normalise them to PNG.
    pub fn from_upload(bytes: &[u8], name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let format = image::guess_format(bytes)
            .map_err(|e| StoreError::InvalidImage(format!("{name}: {e}")))?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| StoreError::InvalidImage(format!("{name}: {e}")))?;

        let png: Arc<[u8]> = if format == ImageFormat::Png {
            Arc::from(bytes)
        } else {
            let mut buffer = Cursor::new(Vec::new());
            decoded
                .write_to(&mut buffer, ImageFormat::Png)
                .map_err(|e| StoreError::InvalidImage(format!("{name}: {e}")))?;
            Arc::from(buffer.into_inner())
        };

        log::debug!(
            "Normalised upload {} ({:?}, {}x{}) to {} PNG bytes",
            name,
            format,
            decoded.width(),
            decoded.height(),
            png.len()
        );

        Ok(Self {
            name,
            png,
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.png)
    }

    pub fn data_uri(&self) -> String {
        format!("{}{}", PNG_DATA_URI_PREFIX, self.to_base64())
    }
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("name", &self.name)
            .field("png_len", &self.png.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
