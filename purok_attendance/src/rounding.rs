//! Rounding rules of the report.
//!
//! There are two of them and they are not interchangeable:
//! - [`percentage`] turns a fraction into a percentage (multiplied by 100) rounded to two decimals.
//! - [`round_mean`] averages values that are already percentages and rounds the plain
//!   decimal result to two decimals.
//!
//! Both round half up. All the arithmetic is done on integers so that a ratio such as
//! 0.33335 becomes 33.34 and not 33.33.

use crate::config::Percent;

/// Number of decimals kept in a percentage.
pub const DECIMALS: u32 = 2;

const SCALE: i128 = 10_i128.pow(DECIMALS);

// Rounds num / den to the nearest integer, halves go up.
// den must be strictly positive.
fn div_round_half_up(num: i128, den: i128) -> i128 {
    (2 * num + den).div_euclid(2 * den)
}

/// `part / whole * 100`, rounded to [`DECIMALS`] decimals.
///
/// `whole` must be strictly positive. No clamping is applied: a part larger than the whole
/// gives a percentage above 100.
pub fn percentage(part: u64, whole: i64) -> Percent {
    debug_assert!(whole > 0, "percentage: whole must be positive, got {}", whole);
    let num = part as i128 * 100 * SCALE;
    Percent::from_hundredths(div_round_half_up(num, whole as i128) as i64)
}

/// The mean of some percentages, rounded to [`DECIMALS`] decimals.
///
/// The values are not multiplied by 100 again. An empty slice gives zero.
pub fn round_mean(values: &[Percent]) -> Percent {
    if values.is_empty() {
        return Percent::ZERO;
    }
    let total: i128 = values.iter().map(|p| p.hundredths() as i128).sum();
    Percent::from_hundredths(div_round_half_up(total, values.len() as i128) as i64)
}
