//! Shared crate-wide constants.

/// Width of one z-order priority band.
///
/// Stacking values are computed as `priority * Z_BAND_SIZE + counter`, so an
/// element with a higher priority always renders above any element with a
/// lower one as long as the running counter stays below this value.
pub const Z_BAND_SIZE: i64 = 1_000_000;

/// Rows left between two floating widgets stacked in the same corner.
///
/// Units: terminal rows.
pub const FLOATING_STACK_GAP: u16 = 1;

/// Distance kept between a corner-anchored widget and the viewport edge.
pub const FLOATING_EDGE_INSET: u16 = 1;

/// Posts older than this many days are purged by the retention pass, together
/// with their replies and attached images.
pub const FORUM_RETENTION_DAYS: i64 = 30;

/// Pointer travel (in cells) below which a press-and-release on a floating
/// widget counts as a click instead of a drag.
pub const DRAG_CLICK_SLOP: u16 = 1;
