//! Individual image operations.
//!
//! Each function takes a borrowed [`RasterImage`] and returns a new one; inputs
//! are never mutated. Resampling work (resize, blur, quarter turns) is delegated
//! to the `image` crate; per-pixel color math operates on the raw interleaved
//! buffer.
//!
//! | Operation | Implementation |
//! |---|---|
//! | Resize (exact / fit / fill / pad) | `DynamicImage::resize_exact`, `crop_imm`, `imageops::replace` |
//! | Quarter-turn rotation | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Arbitrary rotation | bilinear inverse mapping about the center |
//! | Grayscale | ITU-R 601-2 luma written back to R, G and B |
//! | Contrast / saturation / brightness | interpolation against a degenerate image |
//! | Tint | per-channel linear blend toward a solid color |
//! | Transparency | alpha multiplication |
//! | Blur | `DynamicImage::blur` (Gaussian) |

use super::calculations::{
    calculate_center_offset, calculate_fill_dimensions, calculate_fit_dimensions,
    calculate_rotated_canvas,
};
use super::params::{Resize, ResizeMode, Rotation, Tint};
use crate::raster::{ColorMode, RasterImage};
use image::DynamicImage;

/// Round and clamp a channel value into a byte.
#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// ITU-R 601-2 luma of an RGB triple, rounded.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}

/// Number of leading color channels (alpha excluded).
fn color_channels(mode: ColorMode) -> usize {
    if mode.has_alpha() {
        mode.channels() - 1
    } else {
        mode.channels()
    }
}

/// Rebuild a raster from a pixel buffer that has the same shape as `like`.
fn with_pixels(like: &RasterImage, mode: ColorMode, pixels: Vec<u8>) -> RasterImage {
    RasterImage::new(like.width(), like.height(), mode, pixels)
        .expect("per-pixel operations preserve buffer shape")
}

/// Apply `f` to the color channels of every pixel, leaving alpha untouched.
fn map_color_pixels(img: &RasterImage, mut f: impl FnMut(&mut [u8])) -> RasterImage {
    let channels = img.channels();
    let colors = color_channels(img.mode());
    let mut pixels = img.pixels().to_vec();
    for px in pixels.chunks_exact_mut(channels) {
        f(&mut px[..colors]);
    }
    with_pixels(img, img.mode(), pixels)
}

fn blank_like(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) => DynamicImage::new_luma8(width, height),
        DynamicImage::ImageLumaA8(_) => DynamicImage::new_luma_a8(width, height),
        DynamicImage::ImageRgb8(_) => DynamicImage::new_rgb8(width, height),
        _ => DynamicImage::new_rgba8(width, height),
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Resize according to the mode in `params`.
pub fn resize(img: &RasterImage, params: &Resize) -> RasterImage {
    let target = (params.width, params.height);
    if img.dimensions() == target {
        return img.clone();
    }
    let filter = params.filter.filter_type();
    let dynamic = img.to_dynamic();

    let resized = match params.mode {
        ResizeMode::Exact => dynamic.resize_exact(params.width, params.height, filter),
        ResizeMode::Fit => {
            let (w, h) = calculate_fit_dimensions(img.dimensions(), target);
            dynamic.resize_exact(w, h, filter)
        }
        ResizeMode::Fill => {
            let (w, h) = calculate_fill_dimensions(img.dimensions(), target);
            let covered = dynamic.resize_exact(w, h, filter);
            let (x, y) = calculate_center_offset((w, h), target);
            covered.crop_imm(x, y, params.width, params.height)
        }
        ResizeMode::Pad => {
            let fitted_dims = calculate_fit_dimensions(img.dimensions(), target);
            let fitted = dynamic.resize_exact(fitted_dims.0, fitted_dims.1, filter);
            let mut canvas = blank_like(&dynamic, params.width, params.height);
            let (x, y) = calculate_center_offset(target, fitted_dims);
            image::imageops::replace(&mut canvas, &fitted, x as i64, y as i64);
            canvas
        }
    };
    RasterImage::from(resized)
}

/// Rotate counter-clockwise by `rotation.degrees`.
///
/// Quarter turns are exact pixel permutations whenever the canvas allows it
/// (180°, square images, or expand mode). Everything else is resampled
/// bilinearly; uncovered canvas pixels are zero.
pub fn rotate(img: &RasterImage, rotation: &Rotation) -> RasterImage {
    if rotation.is_identity() || img.is_empty() {
        return img.clone();
    }
    let degrees = rotation.normalized_degrees();
    let quarter = (degrees / 90.0).round();
    let is_quarter = (degrees - quarter * 90.0).abs() < 1e-9;
    let square = img.width() == img.height();

    if is_quarter {
        let dynamic = img.to_dynamic();
        // The image crate turns clockwise; counter-clockwise 90° is clockwise 270°.
        match quarter as u32 % 4 {
            2 => return RasterImage::from(dynamic.rotate180()),
            1 if rotation.expand || square => return RasterImage::from(dynamic.rotate270()),
            3 if rotation.expand || square => return RasterImage::from(dynamic.rotate90()),
            _ => {}
        }
    }

    let canvas = if rotation.expand {
        calculate_rotated_canvas(img.dimensions(), degrees)
    } else {
        img.dimensions()
    };
    rotate_resampled(img, degrees.to_radians(), canvas)
}

/// Bilinear inverse-mapped rotation onto a canvas of the given size.
fn rotate_resampled(img: &RasterImage, theta: f64, canvas: (u32, u32)) -> RasterImage {
    let (src_w, src_h) = (img.width() as usize, img.height() as usize);
    let (out_w, out_h) = canvas;
    let channels = img.channels();
    let src = img.pixels();

    let (sin, cos) = theta.sin_cos();
    let (src_cx, src_cy) = (src_w as f64 / 2.0, src_h as f64 / 2.0);
    let (out_cx, out_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);

    let mut out = vec![0u8; out_w as usize * out_h as usize * channels];
    let mut acc = vec![0f64; channels];

    for y in 0..out_h as usize {
        for x in 0..out_w as usize {
            let dx = x as f64 + 0.5 - out_cx;
            let dy = y as f64 + 0.5 - out_cy;
            // Inverse of a counter-clockwise turn in y-down coordinates.
            let sx = dx * cos - dy * sin + src_cx - 0.5;
            let sy = dx * sin + dy * cos + src_cy - 0.5;

            if sx < -0.5 || sy < -0.5 || sx >= src_w as f64 - 0.5 || sy >= src_h as f64 - 0.5 {
                continue;
            }

            let x0 = sx.floor();
            let y0 = sy.floor();
            let (fx, fy) = (sx - x0, sy - y0);
            let clamp_x = |v: f64| v.clamp(0.0, (src_w - 1) as f64) as usize;
            let clamp_y = |v: f64| v.clamp(0.0, (src_h - 1) as f64) as usize;
            let (xa, xb) = (clamp_x(x0), clamp_x(x0 + 1.0));
            let (ya, yb) = (clamp_y(y0), clamp_y(y0 + 1.0));

            acc.iter_mut().for_each(|a| *a = 0.0);
            for (px, py, weight) in [
                (xa, ya, (1.0 - fx) * (1.0 - fy)),
                (xb, ya, fx * (1.0 - fy)),
                (xa, yb, (1.0 - fx) * fy),
                (xb, yb, fx * fy),
            ] {
                let base = (py * src_w + px) * channels;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += src[base + c] as f64 * weight;
                }
            }

            let base = (y * out_w as usize + x) * channels;
            for (c, a) in acc.iter().enumerate() {
                out[base + c] = to_channel(*a as f32);
            }
        }
    }

    RasterImage::new(out_w, out_h, img.mode(), out).expect("canvas buffer sized from dimensions")
}

// =============================================================================
// Color
// =============================================================================

/// Replace R, G and B with their luma. Alpha and color mode are preserved.
pub fn grayscale(img: &RasterImage) -> RasterImage {
    if !img.mode().has_color() {
        return img.clone();
    }
    map_color_pixels(img, |px| {
        let l = luma(px[0], px[1], px[2]);
        px.fill(l);
    })
}

/// Mean luma over all pixels, rounded.
fn mean_luma(img: &RasterImage) -> f32 {
    let channels = img.channels();
    let count = (img.width() as u64 * img.height() as u64).max(1);
    let sum: u64 = img
        .pixels()
        .chunks_exact(channels)
        .map(|px| {
            if img.mode().has_color() {
                luma(px[0], px[1], px[2]) as u64
            } else {
                px[0] as u64
            }
        })
        .sum();
    (sum as f64 / count as f64).round() as f32
}

/// Scale distance from the mean luma: `mean + factor * (c - mean)`.
pub fn adjust_contrast(img: &RasterImage, factor: f32) -> RasterImage {
    let mean = mean_luma(img);
    map_color_pixels(img, |px| {
        for c in px.iter_mut() {
            *c = to_channel(mean + factor * (*c as f32 - mean));
        }
    })
}

/// Scale distance from each pixel's own luma: `luma + factor * (c - luma)`.
pub fn adjust_saturation(img: &RasterImage, factor: f32) -> RasterImage {
    if !img.mode().has_color() {
        return img.clone();
    }
    map_color_pixels(img, |px| {
        let l = luma(px[0], px[1], px[2]) as f32;
        for c in px.iter_mut() {
            *c = to_channel(l + factor * (*c as f32 - l));
        }
    })
}

/// Multiply color channels by `factor`.
pub fn adjust_brightness(img: &RasterImage, factor: f32) -> RasterImage {
    map_color_pixels(img, |px| {
        for c in px.iter_mut() {
            *c = to_channel(*c as f32 * factor);
        }
    })
}

/// Blend toward the tint color: `c * (1 - i) + tint * i`.
///
/// Luminance-only images are promoted to RGB/RGBA first. Alpha is untouched.
pub fn tint(img: &RasterImage, tint: &Tint) -> RasterImage {
    let promoted;
    let source = if img.mode().has_color() {
        img
    } else {
        promoted = img.convert(img.mode().with_color());
        &promoted
    };
    let i = tint.intensity;
    map_color_pixels(source, |px| {
        for (c, &t) in px.iter_mut().zip(tint.color.iter()) {
            *c = to_channel(*c as f32 * (1.0 - i) + t as f32 * i);
        }
    })
}

/// Multiply alpha by `factor`, adding an opaque alpha channel first if needed.
pub fn set_transparency(img: &RasterImage, factor: f32) -> RasterImage {
    let source = img.convert(img.mode().with_alpha());
    let channels = source.channels();
    let mut pixels = source.pixels().to_vec();
    for px in pixels.chunks_exact_mut(channels) {
        let a = &mut px[channels - 1];
        *a = to_channel(*a as f32 * factor);
    }
    with_pixels(&source, source.mode(), pixels)
}

/// Gaussian blur with sigma equal to `radius`.
pub fn blur(img: &RasterImage, radius: f32) -> RasterImage {
    if radius <= 0.0 {
        return img.clone();
    }
    RasterImage::from(img.to_dynamic().blur(radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::ResampleFilter;
    use crate::test_helpers::{gradient_rgba, solid};

    // =========================================================================
    // Resize
    // =========================================================================

    #[test]
    fn resize_exact_stretches() {
        let img = gradient_rgba(40, 20);
        let out = resize(&img, &Resize::new(10, 30));
        assert_eq!(out.dimensions(), (10, 30));
        assert_eq!(out.mode(), ColorMode::Rgba);
    }

    #[test]
    fn resize_fit_preserves_aspect() {
        let img = gradient_rgba(40, 20);
        let out = resize(&img, &Resize::new(10, 10).with_mode(ResizeMode::Fit));
        assert_eq!(out.dimensions(), (10, 5));
    }

    #[test]
    fn resize_fill_crops_to_box() {
        let img = gradient_rgba(40, 20);
        let out = resize(&img, &Resize::new(10, 10).with_mode(ResizeMode::Fill));
        assert_eq!(out.dimensions(), (10, 10));
    }

    #[test]
    fn resize_fill_keeps_the_center() {
        // Red | green | blue bands; 40x20 covers 10x10 at 20x10, and the
        // centered crop keeps source columns 10..30 only.
        let mut pixels = Vec::new();
        for _ in 0..20 {
            for x in 0..40 {
                let px = match x {
                    0..10 => [255, 0, 0],
                    10..30 => [0, 255, 0],
                    _ => [0, 0, 255],
                };
                pixels.extend_from_slice(&px);
            }
        }
        let img = RasterImage::new(40, 20, ColorMode::Rgb, pixels).unwrap();
        let out = resize(
            &img,
            &Resize::new(10, 10)
                .with_mode(ResizeMode::Fill)
                .with_filter(ResampleFilter::Nearest),
        );
        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.pixels().chunks_exact(3).all(|px| px == [0, 255, 0]));
    }

    #[test]
    fn resize_pad_centers_on_transparent_canvas() {
        let img = solid(40, 20, ColorMode::Rgba, &[200, 10, 10, 255]);
        let out = resize(
            &img,
            &Resize::new(10, 10)
                .with_mode(ResizeMode::Pad)
                .with_filter(ResampleFilter::Nearest),
        );
        assert_eq!(out.dimensions(), (10, 10));
        // Fitted 10x5 content sits at rows 2..7
        assert_eq!(out.pixel(5, 0), &[0, 0, 0, 0]);
        assert_eq!(out.pixel(5, 4), &[200, 10, 10, 255]);
        assert_eq!(out.pixel(5, 9), &[0, 0, 0, 0]);
    }

    #[test]
    fn resize_to_same_dimensions_is_identity() {
        let img = gradient_rgba(16, 16);
        assert_eq!(resize(&img, &Resize::new(16, 16)), img);
    }

    // =========================================================================
    // Rotate
    // =========================================================================

    #[test]
    fn rotate_quarter_turn_counter_clockwise() {
        // 2x1 image: left pixel 1, right pixel 2 → after 90° CCW the right
        // pixel ends up on top.
        let img = RasterImage::new(2, 1, ColorMode::L, vec![1, 2]).unwrap();
        let out = rotate(&img, &Rotation::new(90.0, true));
        assert_eq!(out.dimensions(), (1, 2));
        assert_eq!(out.pixels(), &[2, 1]);
    }

    #[test]
    fn rotate_180_reverses_pixels() {
        let img = RasterImage::new(3, 1, ColorMode::L, vec![1, 2, 3]).unwrap();
        let out = rotate(&img, &Rotation::new(180.0, false));
        assert_eq!(out.pixels(), &[3, 2, 1]);
    }

    #[test]
    fn rotate_fixed_canvas_keeps_dimensions() {
        let img = gradient_rgba(30, 20);
        let out = rotate(&img, &Rotation::new(90.0, false));
        assert_eq!(out.dimensions(), (30, 20));
        let out = rotate(&img, &Rotation::new(33.0, false));
        assert_eq!(out.dimensions(), (30, 20));
    }

    #[test]
    fn rotate_expand_grows_canvas() {
        let img = solid(10, 10, ColorMode::Rgba, &[255, 255, 255, 255]);
        let out = rotate(&img, &Rotation::new(45.0, true));
        assert_eq!(out.dimensions(), (15, 15));
        // Corners are uncovered → transparent; center is covered.
        assert_eq!(out.pixel(0, 0), &[0, 0, 0, 0]);
        assert_eq!(out.pixel(7, 7), &[255, 255, 255, 255]);
    }

    #[test]
    fn rotate_full_turn_is_identity() {
        let img = gradient_rgba(12, 7);
        assert_eq!(rotate(&img, &Rotation::new(360.0, true)), img);
    }

    // =========================================================================
    // Color
    // =========================================================================

    #[test]
    fn luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn grayscale_equalizes_channels_and_keeps_alpha() {
        let img = RasterImage::new(1, 1, ColorMode::Rgba, vec![255, 0, 0, 77]).unwrap();
        let out = grayscale(&img);
        assert_eq!(out.pixels(), &[76, 76, 76, 77]);
    }

    #[test]
    fn grayscale_leaves_luma_images_alone() {
        let img = RasterImage::new(2, 1, ColorMode::La, vec![9, 1, 8, 2]).unwrap();
        assert_eq!(grayscale(&img), img);
    }

    #[test]
    fn contrast_zero_collapses_to_mean() {
        let img = RasterImage::new(2, 1, ColorMode::L, vec![0, 200]).unwrap();
        let out = adjust_contrast(&img, 0.0);
        assert_eq!(out.pixels(), &[100, 100]);
    }

    #[test]
    fn contrast_two_stretches_and_clamps() {
        let img = RasterImage::new(2, 1, ColorMode::L, vec![50, 150]).unwrap();
        let out = adjust_contrast(&img, 2.0);
        assert_eq!(out.pixels(), &[0, 200]);
    }

    #[test]
    fn saturation_zero_is_grayscale() {
        let img = RasterImage::new(1, 1, ColorMode::Rgb, vec![255, 0, 0]).unwrap();
        assert_eq!(adjust_saturation(&img, 0.0).pixels(), &[76, 76, 76]);
    }

    #[test]
    fn brightness_scales_and_keeps_alpha() {
        let img = RasterImage::new(1, 1, ColorMode::Rgba, vec![100, 200, 10, 50]).unwrap();
        assert_eq!(adjust_brightness(&img, 2.0).pixels(), &[200, 255, 20, 50]);
    }

    #[test]
    fn tint_half_blends_linearly() {
        let img = RasterImage::new(1, 1, ColorMode::Rgba, vec![0, 100, 200, 123]).unwrap();
        let out = tint(&img, &Tint::new([200, 100, 0], 0.5));
        assert_eq!(out.pixels(), &[100, 100, 100, 123]);
    }

    #[test]
    fn tint_full_replaces_color() {
        let img = gradient_rgba(8, 8);
        let out = tint(&img, &Tint::new([10, 20, 30], 1.0));
        for px in out.pixels().chunks_exact(4) {
            assert_eq!(&px[..3], &[10, 20, 30]);
        }
        assert_eq!(out.alpha_channel(), img.alpha_channel());
    }

    #[test]
    fn tint_promotes_luma() {
        let img = RasterImage::new(1, 1, ColorMode::La, vec![100, 9]).unwrap();
        let out = tint(&img, &Tint::new([200, 0, 100], 0.5));
        assert_eq!(out.mode(), ColorMode::Rgba);
        assert_eq!(out.pixels(), &[150, 50, 100, 9]);
    }

    #[test]
    fn transparency_adds_alpha_and_scales() {
        let img = RasterImage::new(1, 1, ColorMode::Rgb, vec![1, 2, 3]).unwrap();
        let out = set_transparency(&img, 0.5);
        assert_eq!(out.mode(), ColorMode::Rgba);
        assert_eq!(out.pixels(), &[1, 2, 3, 128]);
    }

    #[test]
    fn blur_preserves_dimensions_and_mode() {
        let img = gradient_rgba(20, 10);
        let out = blur(&img, 1.5);
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.mode(), ColorMode::Rgba);
        assert_ne!(out, img);
    }

    #[test]
    fn operations_do_not_mutate_input() {
        let img = gradient_rgba(6, 6);
        let copy = img.clone();
        let _ = tint(&img, &Tint::new([1, 2, 3], 0.7));
        let _ = grayscale(&img);
        let _ = rotate(&img, &Rotation::new(30.0, true));
        assert_eq!(img, copy);
    }
}
