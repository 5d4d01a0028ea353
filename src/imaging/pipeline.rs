//! The transformation pipeline.
//!
//! [`apply_transformations`] validates a [`TransformConfig`] once, then folds
//! its planned [`Step`]s over the input in the fixed order resize → rotate →
//! grayscale → contrast → saturation → brightness → tint → transparency →
//! blur. The order is part of the contract: resizing before blurring keeps the
//! blur radius relative to the output scale, and tinting after grayscale is
//! what produces colorized grayscale.
//!
//! The input is borrowed and never modified, so one source image can feed any
//! number of calls (for example one per animation frame) from any number of
//! threads.

use super::operations;
use super::params::{Step, TransformConfig};
use crate::error::{Error, Result};
use crate::raster::RasterImage;

/// Apply every configured transformation, returning a new image.
///
/// All-or-nothing: validation failures are reported before any pixel work.
pub fn apply_transformations(image: &RasterImage, config: &TransformConfig) -> Result<RasterImage> {
    config.validate()?;
    if image.is_empty() {
        return Err(Error::validation(format!(
            "cannot transform a {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let steps = config.steps();
    let mut current = image.clone();
    for step in &steps {
        log::debug!(
            "{step} on {}x{} {}",
            current.width(),
            current.height(),
            current.mode()
        );
        current = apply_step(&current, step);
    }
    Ok(current)
}

/// Apply one already-validated step.
pub fn apply_step(image: &RasterImage, step: &Step) -> RasterImage {
    match step {
        Step::Resize(params) => operations::resize(image, params),
        Step::Rotate(rotation) => operations::rotate(image, rotation),
        Step::Grayscale => operations::grayscale(image),
        Step::Contrast(f) => operations::adjust_contrast(image, *f),
        Step::Saturation(f) => operations::adjust_saturation(image, *f),
        Step::Brightness(f) => operations::adjust_brightness(image, *f),
        Step::Tint(tint) => operations::tint(image, tint),
        Step::Transparency(f) => operations::set_transparency(image, *f),
        Step::Blur(radius) => operations::blur(image, *radius),
    }
}
