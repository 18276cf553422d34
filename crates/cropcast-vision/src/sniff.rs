//! Image format detection from leading signature bytes.
//!
//! Uploads are classified by their content only. The filename and the
//! declared content type of a multipart field are never consulted.

use std::fmt::{Display, Formatter};

use image::ImageFormat;

/// Formats recognised by [`sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Rgb,
    Pbm,
    Pgm,
    Ppm,
    Rast,
    Xbm,
    Bmp,
    Webp,
    Exr,
}

/// Formats the classifier accepts.
pub const SUPPORTED_KINDS: [ImageKind; 4] = [
    ImageKind::Jpeg,
    ImageKind::Png,
    ImageKind::Bmp,
    ImageKind::Webp,
];

impl ImageKind {
    pub fn name(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Tiff => "tiff",
            ImageKind::Rgb => "rgb",
            ImageKind::Pbm => "pbm",
            ImageKind::Pgm => "pgm",
            ImageKind::Ppm => "ppm",
            ImageKind::Rast => "rast",
            ImageKind::Xbm => "xbm",
            ImageKind::Bmp => "bmp",
            ImageKind::Webp => "webp",
            ImageKind::Exr => "exr",
        }
    }

    pub fn is_supported(self) -> bool {
        SUPPORTED_KINDS.contains(&self)
    }

    /// Decoder to use for this kind, only defined for supported kinds.
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            ImageKind::Jpeg => Some(ImageFormat::Jpeg),
            ImageKind::Png => Some(ImageFormat::Png),
            ImageKind::Bmp => Some(ImageFormat::Bmp),
            ImageKind::Webp => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

impl Display for ImageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const RAST_SIGNATURE: &[u8] = b"\x59\xa6\x6a\x95";
const EXR_SIGNATURE: &[u8] = b"\x76\x2f\x31\x01";

fn is_jpeg(h: &[u8]) -> bool {
    // SOI followed by the first marker
    if h.starts_with(b"\xff\xd8\xff") {
        return true;
    }
    // JFIF/Exif identifier at the APPn payload offset
    h.len() >= 10 && (&h[6..10] == b"JFIF" || &h[6..10] == b"Exif")
}

fn is_netpbm(h: &[u8], digits: [u8; 2]) -> bool {
    h.len() >= 3
        && h[0] == b'P'
        && digits.contains(&h[1])
        && matches!(h[2], b' ' | b'\t' | b'\n' | b'\r')
}

/// Determine the image kind of `bytes` from its signature.
///
/// Returns `None` when no known signature matches.
pub fn sniff(bytes: &[u8]) -> Option<ImageKind> {
    let h = bytes;
    if is_jpeg(h) {
        Some(ImageKind::Jpeg)
    } else if h.starts_with(PNG_SIGNATURE) {
        Some(ImageKind::Png)
    } else if h.starts_with(b"GIF87a") || h.starts_with(b"GIF89a") {
        Some(ImageKind::Gif)
    } else if h.starts_with(b"MM") || h.starts_with(b"II") {
        Some(ImageKind::Tiff)
    } else if h.starts_with(b"\x01\xda") {
        Some(ImageKind::Rgb)
    } else if is_netpbm(h, [b'1', b'4']) {
        Some(ImageKind::Pbm)
    } else if is_netpbm(h, [b'2', b'5']) {
        Some(ImageKind::Pgm)
    } else if is_netpbm(h, [b'3', b'6']) {
        Some(ImageKind::Ppm)
    } else if h.starts_with(RAST_SIGNATURE) {
        Some(ImageKind::Rast)
    } else if h.starts_with(b"#define ") {
        Some(ImageKind::Xbm)
    } else if h.starts_with(b"BM") {
        Some(ImageKind::Bmp)
    } else if h.len() >= 12 && h.starts_with(b"RIFF") && &h[8..12] == b"WEBP" {
        Some(ImageKind::Webp)
    } else if h.starts_with(EXR_SIGNATURE) {
        Some(ImageKind::Exr)
    } else {
        None
    }
}
