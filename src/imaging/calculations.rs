//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest dimensions that fit inside a box without distortion.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Bounding box (width, height)
///
/// # Returns
/// * `(width, height)` - Fitted dimensions, each at least 1
///
/// # Examples
/// ```
/// # use image_studio::imaging::calculate_fit_dimensions;
/// // 800x600 into a 400x400 box → 400x300
/// assert_eq!(calculate_fit_dimensions((800, 600), (400, 400)), (400, 300));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, tgt_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, tgt_h);
    (w, h)
}

/// Smallest aspect-preserving dimensions that cover the whole box.
///
/// The scale is the larger of the two axis ratios, so one edge matches the box
/// and the other overhangs it; [`resize`](super::operations::resize) then
/// center-crops the overhang.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w as f64).max(tgt_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).max(tgt_w);
    let h = ((src_h as f64 * scale).round() as u32).max(tgt_h);
    (w, h)
}

/// Offset that centers `inner` inside `outer`. Odd remainders go right/bottom.
pub fn calculate_center_offset(outer: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}

/// Canvas size that holds an image rotated by `degrees` without clipping.
///
/// Near-integer results are snapped before rounding up so that exact quarter
/// turns do not gain a spurious pixel from floating point noise.
pub fn calculate_rotated_canvas(source: (u32, u32), degrees: f64) -> (u32, u32) {
    let (w, h) = (source.0 as f64, source.1 as f64);
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());

    let snap_ceil = |v: f64| {
        let rounded = v.round();
        if (v - rounded).abs() < 1e-6 {
            rounded
        } else {
            v.ceil()
        }
    };

    let out_w = snap_ceil(w * cos + h * sin).max(1.0) as u32;
    let out_h = snap_ceil(w * sin + h * cos).max(1.0) as u32;
    (out_w, out_h)
}

/// Dimensions after limiting the longer edge to `max_size` (downscale only).
///
/// Returns `None` when the image already fits.
pub fn calculate_limited_dimensions(source: (u32, u32), max_size: u32) -> Option<(u32, u32)> {
    let (w, h) = source;
    if w.max(h) <= max_size {
        return None;
    }
    Some(calculate_fit_dimensions(source, (max_size, max_size)))
}
