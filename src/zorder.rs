//! Banded z-order arbitration for floating elements.

use crate::constants::Z_BAND_SIZE;
use crate::element::Stacked;

/// Hands out stacking values so the most recently touched element renders on
/// top, while keeping every element of a higher priority band above all
/// elements of lower bands.
#[derive(Debug, Default, Clone)]
pub struct ZOrderArbiter {
    counter: i64,
}

impl ZOrderArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `target` to the top of its priority band.
    ///
    /// A missing target is ignored and does not consume a counter value.
    pub fn bring_to_front<S: Stacked + ?Sized>(&mut self, target: Option<&mut S>, priority: i32) {
        let Some(target) = target else {
            return;
        };
        self.counter += 1;
        let z = (priority as i64)
            .saturating_mul(Z_BAND_SIZE)
            .saturating_add(self.counter);
        tracing::trace!(priority, z, "bring_to_front");
        target.set_z_index(z);
    }

    /// Number of stacking values handed out so far.
    pub fn counter(&self) -> i64 {
        self.counter
    }
}
