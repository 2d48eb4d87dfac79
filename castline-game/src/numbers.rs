//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round to two decimal places, returning 0.0 for non-finite values.
#[must_use]
pub fn round_hundredths(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Widen a count to u64, saturating on targets where usize is wider.
#[must_use]
pub fn count_to_u64(value: usize) -> u64 {
    cast::<usize, u64>(value).unwrap_or(u64::MAX)
}

/// Convert a tally to f64 while allowing precision loss in a single location.
#[must_use]
pub fn tally_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Fraction of `part` over `total`, 0.0 when nothing was counted.
#[must_use]
pub fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count_to_f64(part) / count_to_f64(total)
}
