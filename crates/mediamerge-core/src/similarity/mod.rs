mod frames;
mod ssim;

pub use frames::{FrameDecoder, FrameStream, ImageFrameDecoder};
pub use ssim::score as ssim_score;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use std::path::Path;
use tracing::debug;

/// Aggregate perceptual similarity between two media files.
///
/// Frames are decoded pairwise in temporal order from both files and the
/// comparison stops as soon as either stream is exhausted. Each pair is
/// rescaled to a canonical square resolution, reduced to luminance, and
/// scored with SSIM; the aggregate is the arithmetic mean over all compared
/// pairs. A file that yields no frames aggregates to 0.0 (no match).
pub struct SimilarityScorer<'a> {
    decoder: &'a dyn FrameDecoder,
    frame_size: u32,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(decoder: &'a dyn FrameDecoder, frame_size: u32) -> Self {
        Self { decoder, frame_size }
    }

    pub fn compare(&self, a: &Path, b: &Path) -> f64 {
        let frames_a = match self.decoder.open(a) {
            Ok(frames) => frames,
            Err(err) => {
                debug!("Could not open {} for comparison: {}", a.display(), err);
                return 0.0;
            }
        };
        let frames_b = match self.decoder.open(b) {
            Ok(frames) => frames,
            Err(err) => {
                debug!("Could not open {} for comparison: {}", b.display(), err);
                return 0.0;
            }
        };

        let mut sum = 0.0;
        let mut pairs = 0u32;
        for (frame_a, frame_b) in frames_a.zip(frames_b) {
            let (Ok(frame_a), Ok(frame_b)) = (frame_a, frame_b) else {
                break;
            };
            sum += ssim::score(
                &self.canonical(&frame_a),
                &self.canonical(&frame_b),
            );
            pairs += 1;
        }

        if pairs == 0 {
            0.0
        } else {
            sum / f64::from(pairs)
        }
    }

    fn canonical(&self, frame: &DynamicImage) -> GrayImage {
        frame
            .resize_exact(self.frame_size, self.frame_size, FilterType::Triangle)
            .to_luma8()
    }
}
