//! Content classification helpers
//!
//! Pure functions turning raw accessor payloads into canonical entry
//! content: PNG bytes become a self-contained data URL with pixel
//! dimensions, file payloads become one normalized absolute path.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::GenericImageView;

use crate::shared::error::{CommandError, CommandResult};

/// Prefix of every encoded image entry
pub const DATA_URL_PNG_PREFIX: &str = "data:image/png;base64,";

/// Minimum data-URL length for a capture to count as a real image; the
/// bare prefix is exactly this long, so an empty encode never passes.
pub const MIN_IMAGE_DATA_URL_LEN: usize = 22;

/// An image capture ready for the history: encoded form plus decoded size
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Classify raw PNG bytes from the accessor into an image candidate.
pub fn classify_image(png: &[u8]) -> CommandResult<ImageCandidate> {
    let decoded = image::load_from_memory(png)
        .map_err(|e| CommandError::InvalidInput(format!("Undecodable image payload: {}", e)))?;
    let (width, height) = decoded.dimensions();

    Ok(ImageCandidate {
        data_url: format!("{}{}", DATA_URL_PNG_PREFIX, BASE64.encode(png)),
        width,
        height,
    })
}

/// Recover PNG bytes from a stored image entry's data URL.
pub fn decode_image_data_url(data_url: &str) -> CommandResult<Vec<u8>> {
    let payload = data_url
        .split_once(";base64,")
        .map(|(_, payload)| payload)
        .ok_or_else(|| CommandError::InvalidInput("Not a base64 data URL".to_string()))?;

    BASE64
        .decode(payload)
        .map_err(|e| CommandError::InvalidInput(format!("Corrupt image encoding: {}", e)))
}

/// Normalize a raw file-clipboard payload into `(path, file_name)`.
///
/// Takes only the first line when several paths are present, strips a
/// `file://` scheme and percent-decodes it. Normalization is best effort:
/// a payload that defies decoding is kept as-is rather than rejected.
pub fn normalize_file_path(raw: &str) -> (String, String) {
    let first = raw.trim().lines().next().unwrap_or("").to_string();

    let path = match first.strip_prefix("file://") {
        Some(rest) => match urlencoding::decode(rest) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => rest.to_string(),
        },
        None => first,
    };

    let file_name = std::path::Path::new(&path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());

    (path, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_classify_image_derives_dimensions() {
        let png = png_fixture(4, 7);
        let candidate = classify_image(&png).unwrap();

        assert_eq!(candidate.width, 4);
        assert_eq!(candidate.height, 7);
        assert!(candidate.data_url.starts_with(DATA_URL_PNG_PREFIX));
        assert!(candidate.data_url.len() > MIN_IMAGE_DATA_URL_LEN);
    }

    #[test]
    fn test_data_url_roundtrip() {
        let png = png_fixture(2, 2);
        let candidate = classify_image(&png).unwrap();

        let decoded = decode_image_data_url(&candidate.data_url).unwrap();
        assert_eq!(decoded, png);
    }

    #[test]
    fn test_decode_rejects_non_data_url() {
        assert!(decode_image_data_url("plain text").is_err());
    }

    #[test]
    fn test_classify_rejects_garbage() {
        assert!(classify_image(b"not a png").is_err());
    }

    #[test]
    fn test_normalize_file_uri() {
        let (path, name) = normalize_file_path("file:///Users/x/report%20final.pdf");
        assert_eq!(path, "/Users/x/report final.pdf");
        assert_eq!(name, "report final.pdf");
    }

    #[test]
    fn test_normalize_keeps_plain_path() {
        let (path, name) = normalize_file_path("/tmp/notes.txt");
        assert_eq!(path, "/tmp/notes.txt");
        assert_eq!(name, "notes.txt");
    }

    #[test]
    fn test_normalize_takes_first_of_many() {
        let raw = "file:///a/one.txt\nfile:///b/two.txt";
        let (path, name) = normalize_file_path(raw);
        assert_eq!(path, "/a/one.txt");
        assert_eq!(name, "one.txt");
    }

    #[test]
    fn test_normalize_empty_payload() {
        let (path, name) = normalize_file_path("");
        assert_eq!(path, "");
        assert_eq!(name, "");
    }
}
