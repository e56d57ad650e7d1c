//! Per-page geometry collected during the classification walk.

use super::Dimension;

/// What one page contributes to the scan vote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSample {
    /// Zero-based page index
    pub page_index: usize,
    /// MediaBox size in points, truncated
    pub page_dimension: Dimension,
    /// First image found on the page, or [`Dimension::EMPTY`]
    pub first_image: Dimension,
    /// Page `/UserUnit` (multiples of 1/72 inch)
    pub user_unit: f32,
}

impl PageSample {
    /// Create a sample with the default user unit.
    pub fn new(page_index: usize, page_dimension: Dimension, first_image: Dimension) -> Self {
        Self {
            page_index,
            page_dimension,
            first_image,
            user_unit: 1.0,
        }
    }

    /// Set the user unit.
    pub fn with_user_unit(mut self, user_unit: f32) -> Self {
        self.user_unit = user_unit;
        self
    }

    /// Whether an image was recorded for this page.
    pub fn has_image(&self) -> bool {
        !self.first_image.is_empty()
    }

    /// Density of the recorded image over the page, 0 if it does not
    /// cover the page.
    pub fn density(&self) -> u32 {
        density(&self.first_image, &self.page_dimension, self.user_unit)
    }
}

/// Horizontal dots per inch of an image laid over a page.
///
/// Returns 0 unless the image is at least as large as the page on both
/// axes (in pixels versus points). The result is truncated.
pub fn density(image: &Dimension, page: &Dimension, user_unit: f32) -> u32 {
    if !image.contains(page) || page.width <= 0 {
        return 0;
    }
    let dpi = image.width as f64 / page.width as f64 * 72.0 / effective_user_unit(user_unit);
    log::trace!("Found density of {}", dpi as u32);
    dpi as u32
}

/// A usable user unit: non-finite or non-positive values mean 1.0.
pub(crate) fn effective_user_unit(user_unit: f32) -> f64 {
    if user_unit.is_finite() && user_unit > 0.0 {
        user_unit as f64
    } else {
        1.0
    }
}
