//! Extraction of the generated image and the final answer from a run's events.
//!
//! Both scans work on a fully materialized event list and are independent of
//! each other. [`extract_image`] looks for the first image item returned by a
//! tool, decodes it and writes it to disk; [`extract_text`] joins every text
//! part into the final answer.

use std::fmt;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::{debug, info};

use crate::error::Result;
use crate::event::{Event, Part, ResponseItem};

/// File name used when the caller does not pick an output path.
pub const DEFAULT_IMAGE_FILENAME: &str = "tiny_image.png";

/// Outcome of [`extract_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// The image was decoded and written to this absolute path.
    Saved(PathBuf),
    /// No tool response carried an image item.
    NotFound,
}

impl ImageStatus {
    /// Whether an image was written.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// Path of the written image, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Saved(path) => Some(path),
            Self::NotFound => None,
        }
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved(path) => write!(f, "Image successfully saved to: {}", path.display()),
            Self::NotFound => write!(f, "No image data found in the agent's tool response."),
        }
    }
}

/// Lazily walk every tool response item, in event, part, then item order.
pub fn response_items(events: &[Event]) -> impl Iterator<Item = &ResponseItem> {
    events
        .iter()
        .flat_map(Event::parts)
        .filter_map(Part::as_function_response)
        .flat_map(|response| response.response.content.iter())
}

/// Save the first image returned by a tool to `output_path`.
///
/// The first image item with non-empty data wins; later images are ignored.
/// Any existing file at `output_path` is overwritten.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) if the image payload is not
/// valid standard base64, and [`Error::Io`](crate::Error::Io) if the file
/// cannot be written. A missing image is not an error.
pub fn extract_image(events: &[Event], output_path: impl AsRef<Path>) -> Result<ImageStatus> {
    let Some(encoded) = response_items(events).find_map(ResponseItem::image_data) else {
        debug!(events = events.len(), "No image item in tool responses");
        return Ok(ImageStatus::NotFound);
    };

    let bytes = BASE64.decode(encoded)?;
    let path = output_path.as_ref();
    write_bytes(path, &bytes)?;

    let resolved = path.canonicalize()?;
    info!(path = %resolved.display(), bytes = bytes.len(), "Saved image");
    Ok(ImageStatus::Saved(resolved))
}

/// [`extract_image`] into [`DEFAULT_IMAGE_FILENAME`] in the working directory.
///
/// # Errors
///
/// See [`extract_image`].
pub fn extract_image_default(events: &[Event]) -> Result<ImageStatus> {
    extract_image(events, DEFAULT_IMAGE_FILENAME)
}

/// Concatenate every non-empty text part, in event then part order.
///
/// No separator is inserted. Callers trim the result before display.
#[must_use]
pub fn extract_text(events: &[Event]) -> String {
    events
        .iter()
        .flat_map(Event::parts)
        .filter_map(Part::as_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn write_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()
}
