use std::thread;

/// Exact up to 2^53.
#[inline]
#[must_use]
#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
pub const fn to_f64(value: u64) -> f64 {
    value as f64
}

/// `part / total`, or `None` when `total` is zero.
#[inline]
#[must_use]
pub fn ratio(part: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| to_f64(part) / to_f64(total))
}

#[must_use]
pub fn default_thread_count() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}
