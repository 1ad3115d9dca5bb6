use crate::error::Error;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Ordered stream of decoded frames from one media file.
pub type FrameStream = Box<dyn Iterator<Item = Result<DynamicImage, Error>>>;

/// Frame-decode collaborator seam. The scorer only needs frames in temporal
/// order; what produces them (still decoder, video decoder, test fake) is
/// interchangeable.
pub trait FrameDecoder {
    fn open(&self, path: &Path) -> Result<FrameStream, Error>;
}

/// Still-image decoder backed by the `image` crate. Yields exactly one
/// frame per decodable file; a file that fails to decode yields an empty
/// stream, which aggregates to a similarity of 0 downstream.
pub struct ImageFrameDecoder;

impl FrameDecoder for ImageFrameDecoder {
    fn open(&self, path: &Path) -> Result<FrameStream, Error> {
        match image::open(path) {
            Ok(img) => Ok(Box::new(std::iter::once(Ok(img)))),
            Err(err) => {
                debug!("Could not decode {}: {}", path.display(), err);
                Ok(Box::new(std::iter::empty()))
            }
        }
    }
}
