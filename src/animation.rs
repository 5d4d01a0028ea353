//! Animated sequences: frame sets, GIF encoding and decoding.
//!
//! An [`AnimationFrameSet`] is an ordered, non-empty list of equally sized
//! frames, each shown for its own delay in milliseconds. Frames are built once
//! and then encoded; the pipeline can be applied to every frame through
//! [`AnimationFrameSet::transform`], and [`tinted_variants`] builds a color
//! cycle from a single base image.
//!
//! GIF stores delays in hundredths of a second, so delays below 10 ms and
//! non-multiples of 10 do not survive a round trip exactly.

use crate::error::{Error, Result};
use crate::imaging::{Tint, TransformConfig, apply_transformations};
use crate::raster::{ColorMode, RasterImage};
use image::codecs::gif::{GifDecoder, GifEncoder};
use image::{AnimationDecoder, Delay, DynamicImage, Frame};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// How long each frame is shown, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameDelay {
    Uniform(u32),
    /// One delay per frame, in frame order.
    PerFrame(Vec<u32>),
}

/// Loop behavior of an encoded animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    Infinite,
    /// Play this many times in total.
    Finite(u16),
}

impl Repeat {
    /// GIF convention: `0` loops forever.
    pub fn from_loops(loops: u16) -> Self {
        if loops == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(loops)
        }
    }
}

impl From<Repeat> for image::codecs::gif::Repeat {
    fn from(r: Repeat) -> Self {
        match r {
            Repeat::Infinite => image::codecs::gif::Repeat::Infinite,
            Repeat::Finite(n) => image::codecs::gif::Repeat::Finite(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub image: RasterImage,
    pub delay_ms: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrameSet {
    frames: Vec<AnimationFrame>,
}

impl AnimationFrameSet {
    /// Validate and pair frames with their delays.
    pub fn new(images: Vec<RasterImage>, delay: FrameDelay) -> Result<Self> {
        let Some(first) = images.first() else {
            return Err(Error::validation("an animation needs at least one frame"));
        };
        let dims = first.dimensions();
        if let Some((i, img)) = images
            .iter()
            .enumerate()
            .find(|(_, img)| img.dimensions() != dims)
        {
            return Err(Error::validation(format!(
                "frame {} is {}x{} but frame 1 is {}x{}",
                i + 1,
                img.width(),
                img.height(),
                dims.0,
                dims.1
            )));
        }

        let delays = match delay {
            FrameDelay::Uniform(ms) => vec![ms; images.len()],
            FrameDelay::PerFrame(delays) => {
                if delays.len() != images.len() {
                    return Err(Error::validation(format!(
                        "{} delays given for {} frames",
                        delays.len(),
                        images.len()
                    )));
                }
                delays
            }
        };
        if let Some(i) = delays.iter().position(|&d| d == 0) {
            return Err(Error::validation(format!(
                "frame {} has a delay of 0 ms; delays must be at least 1",
                i + 1
            )));
        }

        let frames = images
            .into_iter()
            .zip(delays)
            .map(|(image, delay_ms)| AnimationFrame { image, delay_ms })
            .collect();
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true for a set built through [`AnimationFrameSet::new`].
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].image.dimensions()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.delay_ms).collect()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.delay_ms as u64).sum()
    }

    /// Apply the pipeline to every frame in parallel, keeping delays.
    pub fn transform(&self, config: &TransformConfig) -> Result<Self> {
        config.validate()?;
        let images = self
            .frames
            .par_iter()
            .map(|f| apply_transformations(&f.image, config))
            .collect::<Result<Vec<_>>>()?;
        Self::new(images, FrameDelay::PerFrame(self.delays()))
    }
}

/// Encode as an animated GIF.
///
/// Frames are converted to RGBA; fully transparent pixels stay transparent.
pub fn encode_gif(set: &AnimationFrameSet, repeat: Repeat) -> Result<Vec<u8>> {
    let encode_err = |e: image::ImageError| Error::Encode {
        format: "gif".to_string(),
        reason: e.to_string(),
    };

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder.set_repeat(repeat.into()).map_err(encode_err)?;
        for frame in set.frames() {
            let rgba = frame.image.convert(ColorMode::Rgba).to_dynamic().into_rgba8();
            let delay = Delay::from_numer_denom_ms(frame.delay_ms, 1);
            encoder
                .encode_frame(Frame::from_parts(rgba, 0, 0, delay))
                .map_err(encode_err)?;
        }
    }
    log::debug!(
        "encoded {} frames ({}x{}) into {} bytes",
        set.len(),
        set.dimensions().0,
        set.dimensions().1,
        buf.len()
    );
    Ok(buf)
}

/// Decode every frame of a GIF. Frames come back as full RGBA canvases.
pub fn decode_gif(bytes: &[u8], origin: &str) -> Result<AnimationFrameSet> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(|e| Error::decode(origin, e))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| Error::decode(origin, e))?;
    if frames.is_empty() {
        return Err(Error::decode(origin, "GIF contains no frames"));
    }

    let mut images = Vec::with_capacity(frames.len());
    let mut delays = Vec::with_capacity(frames.len());
    for frame in frames {
        let (numer, denom) = frame.delay().numer_denom_ms();
        let ms = (numer as f64 / denom.max(1) as f64).round().max(1.0) as u32;
        delays.push(ms);
        images.push(RasterImage::from(DynamicImage::ImageRgba8(frame.into_buffer())));
    }
    AnimationFrameSet::new(images, FrameDelay::PerFrame(delays))
        .map_err(|e| Error::decode(origin, e))
}

/// One frame per color: `base` tinted toward each color at `intensity`.
pub fn tinted_variants(
    base: &RasterImage,
    colors: &[[u8; 3]],
    intensity: f32,
    delay: FrameDelay,
) -> Result<AnimationFrameSet> {
    if colors.is_empty() {
        return Err(Error::validation("at least one tint color is required"));
    }
    let configs: Vec<TransformConfig> = colors
        .iter()
        .map(|&color| TransformConfig {
            tint: Some(Tint::new(color, intensity)),
            ..Default::default()
        })
        .collect();
    configs[0].validate()?;

    let frames = configs
        .par_iter()
        .map(|config| apply_transformations(base, config))
        .collect::<Result<Vec<_>>>()?;
    AnimationFrameSet::new(frames, delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgba, solid};

    fn frame(color: [u8; 3]) -> RasterImage {
        solid(6, 4, ColorMode::Rgb, &color)
    }

    // =========================================================================
    // Frame set validation
    // =========================================================================

    #[test]
    fn uniform_delay_applies_to_all_frames() {
        let set =
            AnimationFrameSet::new(vec![frame([1, 2, 3]), frame([4, 5, 6])], FrameDelay::Uniform(80))
                .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.delays(), vec![80, 80]);
        assert_eq!(set.total_duration_ms(), 160);
        assert_eq!(set.dimensions(), (6, 4));
    }

    #[test]
    fn empty_frame_list_rejected() {
        assert!(matches!(
            AnimationFrameSet::new(vec![], FrameDelay::Uniform(100)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn zero_delay_rejected() {
        let result = AnimationFrameSet::new(
            vec![frame([0, 0, 0]), frame([1, 1, 1])],
            FrameDelay::PerFrame(vec![100, 0]),
        );
        match result {
            Err(Error::Validation(msg)) => assert!(msg.contains("frame 2"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn delay_count_must_match() {
        assert!(matches!(
            AnimationFrameSet::new(vec![frame([0, 0, 0])], FrameDelay::PerFrame(vec![10, 20])),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn mismatched_dimensions_rejected() {
        let odd = solid(5, 4, ColorMode::Rgb, &[0, 0, 0]);
        assert!(matches!(
            AnimationFrameSet::new(vec![frame([0, 0, 0]), odd], FrameDelay::Uniform(10)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn repeat_from_loops() {
        assert_eq!(Repeat::from_loops(0), Repeat::Infinite);
        assert_eq!(Repeat::from_loops(3), Repeat::Finite(3));
    }

    // =========================================================================
    // GIF
    // =========================================================================

    #[test]
    fn gif_roundtrip_keeps_frames_and_delays() {
        let set = AnimationFrameSet::new(
            vec![frame([255, 0, 0]), frame([0, 255, 0]), frame([0, 0, 255])],
            FrameDelay::PerFrame(vec![100, 200, 50]),
        )
        .unwrap();
        let bytes = encode_gif(&set, Repeat::Infinite).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));

        let back = decode_gif(&bytes, "anim.gif").unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.delays(), vec![100, 200, 50]);
        assert_eq!(back.dimensions(), (6, 4));
        assert_eq!(back.frames()[1].image.pixel(0, 0), &[0, 255, 0, 255]);
    }

    #[test]
    fn finite_repeat_encodes() {
        let set = AnimationFrameSet::new(vec![frame([9, 9, 9])], FrameDelay::Uniform(40)).unwrap();
        let bytes = encode_gif(&set, Repeat::Finite(2)).unwrap();
        assert_eq!(decode_gif(&bytes, "once.gif").unwrap().len(), 1);
    }

    #[test]
    fn tiny_delays_decode_as_at_least_one_ms() {
        let set = AnimationFrameSet::new(vec![frame([1, 1, 1])], FrameDelay::Uniform(1)).unwrap();
        let bytes = encode_gif(&set, Repeat::Infinite).unwrap();
        assert!(decode_gif(&bytes, "fast.gif").unwrap().delays()[0] >= 1);
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(
            decode_gif(b"GIF89a but not really", "bad.gif"),
            Err(Error::Decode { .. })
        ));
    }

    // =========================================================================
    // Tinted variants and per-frame transforms
    // =========================================================================

    #[test]
    fn tinted_variants_one_frame_per_color_in_order() {
        let base = solid(4, 4, ColorMode::Rgb, &[100, 100, 100]);
        let set = tinted_variants(
            &base,
            &[[255, 0, 0], [0, 0, 255]],
            1.0,
            FrameDelay::Uniform(120),
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.frames()[0].image.pixel(0, 0), &[255, 0, 0]);
        assert_eq!(set.frames()[1].image.pixel(0, 0), &[0, 0, 255]);
        assert_eq!(set.delays(), vec![120, 120]);
    }

    #[test]
    fn tinted_variants_validate_intensity_and_colors() {
        let base = gradient_rgba(4, 4);
        assert!(matches!(
            tinted_variants(&base, &[[1, 2, 3]], 1.5, FrameDelay::Uniform(10)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            tinted_variants(&base, &[], 0.5, FrameDelay::Uniform(10)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn transform_applies_to_every_frame() {
        let set = AnimationFrameSet::new(
            vec![frame([255, 0, 0]), frame([0, 255, 0])],
            FrameDelay::PerFrame(vec![30, 60]),
        )
        .unwrap();
        let config = TransformConfig {
            grayscale: true,
            ..Default::default()
        };
        let gray = set.transform(&config).unwrap();
        assert_eq!(gray.frames()[0].image.pixel(0, 0), &[76, 76, 76]);
        assert_eq!(gray.frames()[1].image.pixel(0, 0), &[150, 150, 150]);
        assert_eq!(gray.delays(), vec![30, 60]);
    }
}
