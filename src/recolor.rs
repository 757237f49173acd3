//! Tolerance-masked, brightness-preserving color replacement.
//!
//! Every pixel whose RGB distance to the source color is at most the
//! tolerance is replaced by the target color scaled by how bright that
//! pixel is relative to the source. Everything else, including alpha, is
//! left alone.

use image::{ImageBuffer, Pixel, Rgb};
use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;

use crate::error::RecolorError;
use crate::types::Tolerance;
use crate::utils::{brightness, color_distance, rgb_to_f32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecolorStats {
    pub matched: usize,
    pub total: usize,
}

/// Inputs of one recolor, with the per-call constants worked out up front.
#[derive(Debug, Clone, PartialEq)]
pub struct RecolorPlan {
    source: [f32; 3],
    target: [f32; 3],
    tolerance: f32,
    source_brightness: f32,
    target_brightness: f32,
}

impl RecolorPlan {
    pub fn new(source: Rgb<u8>, target: Rgb<u8>, tolerance: Tolerance) -> Self {
        let source = rgb_to_f32(&source.0);
        let target = rgb_to_f32(&target.0);
        RecolorPlan {
            source,
            target,
            tolerance: tolerance.value() as f32,
            source_brightness: brightness(source),
            target_brightness: brightness(target),
        }
    }

    pub fn source_brightness(&self) -> f32 {
        self.source_brightness
    }

    /// Mean channel value of the target color. Not used when scaling pixels,
    /// only reported.
    pub fn target_brightness(&self) -> f32 {
        self.target_brightness
    }

    /// `rgb` holds at least the three color channels of one pixel.
    pub fn matches(&self, rgb: &[u8]) -> bool {
        color_distance(rgb_to_f32(rgb), self.source) <= self.tolerance
    }

    pub fn brightness_factor(&self, rgb: &[u8]) -> f32 {
        if self.source_brightness != 0.0 {
            brightness(rgb_to_f32(rgb)) / self.source_brightness
        } else {
            1.0
        }
    }

    /// Target color scaled to the brightness of `rgb`, clamped and truncated.
    pub fn adjusted(&self, rgb: &[u8]) -> [u8; 3] {
        let factor = self.brightness_factor(rgb);
        self.target
            .map(|channel| (channel * factor).clamp(0.0, 255.0) as u8)
    }

    pub fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>) -> Result<RecolorStats, RecolorError>
    where
        P: Pixel<Subpixel = u8>,
    {
        self.apply_with_progress(image, &ProgressBar::hidden())
    }

    /// Recolors `image` in place, ticking `pb` once per row.
    pub fn apply_with_progress<P>(
        &self,
        image: &mut ImageBuffer<P, Vec<u8>>,
        pb: &ProgressBar,
    ) -> Result<RecolorStats, RecolorError>
    where
        P: Pixel<Subpixel = u8>,
    {
        let channels = P::CHANNEL_COUNT as usize;
        if channels < 3 {
            return Err(RecolorError::TooFewChannels(P::CHANNEL_COUNT));
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RecolorError::EmptyImage);
        }

        debug!(
            "recolor: source brightness {:.3}, target brightness {:.3}, tolerance {}",
            self.source_brightness, self.target_brightness, self.tolerance
        );

        let row_len = width as usize * channels;
        let matched = image
            .par_chunks_mut(row_len)
            .map(|row| {
                let mut matched = 0usize;
                for pixel in row.chunks_exact_mut(channels) {
                    if self.matches(pixel) {
                        let adjusted = self.adjusted(pixel);
                        pixel[..3].copy_from_slice(&adjusted);
                        matched += 1;
                    }
                }
                pb.inc(1);
                matched
            })
            .sum::<usize>();

        Ok(RecolorStats {
            matched,
            total: width as usize * height as usize,
        })
    }
}

/// Returns a recolored copy of `image`, leaving the input untouched.
pub fn recolor<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    source: Rgb<u8>,
    target: Rgb<u8>,
    tolerance: Tolerance,
) -> Result<ImageBuffer<P, Vec<u8>>, RecolorError>
where
    P: Pixel<Subpixel = u8>,
{
    let mut output = image.clone();
    RecolorPlan::new(source, target, tolerance).apply(&mut output)?;
    Ok(output)
}
