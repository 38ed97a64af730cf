//! Wheel layout and rotation targets
//!
//! The wheel shows every catalog category twice, in alternating order
//! (`0, 1, .., n-1, 0, 1, .., n-1`), so category `i` sits on segments
//! `[i, i + n]`. The doubled layout is purely visual: the winning category is
//! decided by the selector's weights, and the presenter only chooses which of
//! the two copies the pointer stops on.

use crate::catalog::Catalog;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

/// Full turns before the wheel settles
pub const MIN_REVOLUTIONS: u32 = 5;

/// Spin animation length; the result is revealed only after it elapses
pub const SPIN_DURATION: Duration = Duration::from_millis(4000);

/// One visual slice of the wheel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelSegment {
    pub index: usize,
    /// Catalog index of the category shown on this slice
    pub category: usize,
    pub label: String,
    pub color: String,
    pub text_color: String,
    /// Center angle of the slice in degrees
    pub angle: f64,
    /// Conic-gradient span of the slice, in percent of the circle
    pub gradient_start: f64,
    pub gradient_end: f64,
}

/// Where the wheel should stop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotation {
    /// Segment under the pointer when the wheel stops
    pub segment: usize,
    /// Absolute rotation to animate to, in degrees
    pub degrees: f64,
    /// The category had no usable mapping and the default pair was used
    pub fallback: bool,
}

/// Rotation that lands the pointer on the center of `index`
///
/// `360 * revolutions + (360 - (index * segment_angle + segment_angle / 2))`
pub fn target_rotation(index: usize, total_segments: usize, revolutions: u32) -> f64 {
    let segment_angle = 360.0 / total_segments as f64;
    let offset = segment_angle / 2.0;
    360.0 * f64::from(revolutions) + (360.0 - (index as f64 * segment_angle + offset))
}

/// Segment layout derived from a catalog
#[derive(Debug, Clone)]
pub struct WheelLayout {
    segments: Vec<WheelSegment>,
    categories: usize,
    min_revolutions: u32,
}

impl WheelLayout {
    pub fn new(catalog: &Catalog) -> Self {
        let categories = catalog.len();
        let total = categories * 2;
        let segment_angle = 360.0 / total as f64;

        let segments = (0..total)
            .map(|index| {
                let category = index % categories;
                let prize = &catalog.categories()[category];
                WheelSegment {
                    index,
                    category,
                    label: prize.label.clone(),
                    color: prize.color.clone(),
                    text_color: prize.text_color.clone(),
                    angle: index as f64 * segment_angle + segment_angle / 2.0,
                    gradient_start: index as f64 / total as f64 * 100.0,
                    gradient_end: (index + 1) as f64 / total as f64 * 100.0,
                }
            })
            .collect();

        Self {
            segments,
            categories,
            min_revolutions: MIN_REVOLUTIONS,
        }
    }

    /// Override the number of full turns (visual only)
    pub fn with_min_revolutions(mut self, revolutions: u32) -> Self {
        self.min_revolutions = revolutions;
        self
    }

    pub fn segments(&self) -> &[WheelSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn min_revolutions(&self) -> u32 {
        self.min_revolutions
    }

    pub fn segment_angle(&self) -> f64 {
        360.0 / self.len() as f64
    }

    /// The two segments showing a category, if the category is on the wheel
    pub fn segment_pair(&self, category: usize) -> Option<[usize; 2]> {
        (category < self.categories).then(|| [category, category + self.categories])
    }

    /// Pair used when a category has no usable mapping
    pub fn fallback_pair(&self) -> [usize; 2] {
        [0, self.categories]
    }

    /// Final pointer angle (mod 360) for a segment
    pub fn landing_angle(&self, index: usize) -> f64 {
        let segment_angle = self.segment_angle();
        360.0 - (index as f64 * segment_angle + segment_angle / 2.0)
    }

    /// Rotation for a drawn category, choosing one of its two segments
    pub fn rotation_for<R: Rng + ?Sized>(&self, category: usize, rng: &mut R) -> Rotation {
        let (pair, fallback) = match self.segment_pair(category) {
            Some(pair) => (pair, false),
            None => (self.fallback_pair(), true),
        };
        self.rotation_to(pair, fallback, rng)
    }

    /// Rotation for a category known only by its display label
    pub fn rotation_for_label<R: Rng + ?Sized>(&self, label: &str, rng: &mut R) -> Rotation {
        match self.category_of(label) {
            Some(category) => self.rotation_for(category, rng),
            None => self.rotation_to(self.fallback_pair(), true, rng),
        }
    }

    /// Catalog index for a label shown on the wheel
    pub fn category_of(&self, label: &str) -> Option<usize> {
        self.segments[..self.categories]
            .iter()
            .position(|s| s.label == label)
    }

    fn rotation_to<R: Rng + ?Sized>(&self, pair: [usize; 2], fallback: bool, rng: &mut R) -> Rotation {
        let segment = pair[rng.gen_range(0..2)];
        Rotation {
            segment,
            degrees: target_rotation(segment, self.len(), self.min_revolutions),
            fallback,
        }
    }
}
