//! Option image uploads: type detection from content and size checks.

use std::fmt;

/// Image formats accepted for poll options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Svg,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xff\xd8\xff";
/// How far into an SVG document we look for the root element.
const SVG_SNIFF_LEN: usize = 1024;

impl ImageKind {
    /// Detects the format from the file's leading bytes. The client-supplied
    /// filename and content type are not trusted.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(PNG_SIGNATURE) {
            return Some(ImageKind::Png);
        }
        if data.starts_with(JPEG_SIGNATURE) {
            return Some(ImageKind::Jpeg);
        }

        let head = &data[..data.len().min(SVG_SNIFF_LEN)];
        let text = String::from_utf8_lossy(head);
        if svg_root(text.trim_start_matches('\u{feff}')) {
            return Some(ImageKind::Svg);
        }

        None
    }

    /// Extension used for the stored filename.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Svg => "svg",
        }
    }

    pub fn mime(&self) -> mime::Mime {
        match self {
            ImageKind::Jpeg => mime::IMAGE_JPEG,
            ImageKind::Png => mime::IMAGE_PNG,
            ImageKind::Svg => mime::IMAGE_SVG,
        }
    }
}

/// True when the first element of `text` is `<svg`. Only an XML declaration,
/// comments, a doctype and whitespace may come before it.
fn svg_root(mut text: &str) -> bool {
    loop {
        text = text.trim_start();
        let skip_to = if text.starts_with("<?") {
            "?>"
        } else if text.starts_with("<!--") {
            "-->"
        } else if text.starts_with("<!DOCTYPE") || text.starts_with("<!doctype") {
            ">"
        } else {
            break;
        };
        match text.find(skip_to) {
            Some(end) => text = &text[end + skip_to.len()..],
            None => return false,
        }
    }

    match text.strip_prefix("<svg") {
        Some(rest) => matches!(
            rest.chars().next(),
            Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/'
        ),
        None => false,
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime().essence_str())
    }
}

/// A file received in a multipart form, not yet checked.
#[derive(Clone, Debug, Default)]
pub struct UploadedImage {
    pub original_name: Option<String>,
    pub data: Vec<u8>,
    /// Set when the upload was cut off at the size limit while reading.
    pub truncated: bool,
}

/// An upload that passed type and size checks.
#[derive(Clone, Debug)]
pub struct ValidImage {
    pub kind: ImageKind,
    pub data: Vec<u8>,
}

/// Reasons an upload is refused. The text is shown next to the form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageRejection {
    Empty,
    TooLarge { max_kb: u32 },
    UnsupportedType,
}

impl fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRejection::Empty => write!(f, "The image field is required."),
            ImageRejection::TooLarge { max_kb } => {
                write!(f, "The image may not be greater than {} kilobytes.", max_kb)
            }
            ImageRejection::UnsupportedType => {
                write!(f, "The image must be a file of type: jpg, png, jpeg, svg.")
            }
        }
    }
}

impl UploadedImage {
    /// Checks the upload against the accepted formats and `max_kb`.
    pub fn validate(self, max_kb: u32) -> Result<ValidImage, ImageRejection> {
        if self.data.is_empty() && !self.truncated {
            return Err(ImageRejection::Empty);
        }
        if self.truncated || self.data.len() > max_bytes(max_kb) {
            return Err(ImageRejection::TooLarge { max_kb });
        }
        let kind = ImageKind::detect(&self.data).ok_or(ImageRejection::UnsupportedType)?;
        Ok(ValidImage {
            kind,
            data: self.data,
        })
    }
}

pub fn max_bytes(max_kb: u32) -> usize {
    max_kb as usize * 1024
}
