//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap a value into the half-open range `[-period/2, period/2)`.
///
/// Used for signed distances on a closed loop, where the shortest way round
/// is the one that matters.
pub fn wrap_signed<T>(value: T, period: T) -> T
where
    T: Float
{
    let half = period / (T::one() + T::one());
    rem_euclid(value + half, period) - half
}

/// Get the unsigned shortest angular distance between two angles.
///
/// The result is in the range `[0, pi]` regardless of how many turns apart the
/// inputs are.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    wrap_signed(a - b, tau_t).abs()
}
