//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the signed angular distance between two angles in the range of [0, 2pi].
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// between 0 and 2pi.
pub fn get_ang_dist_2pi<T>(a: T, b: T) -> T
where
    T: Float + FloatConst
{
    let tau_t = tau::<T>();
    
    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        -c
    }
    else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range `[0, 2pi)`.
///
/// Unlike [`rem_euclid`] the upper bound is never returned, which makes the wrap idempotent.
/// Non-finite angles are mapped to zero.
pub fn wrap_2pi<T>(value: T) -> T
where
    T: Float + FloatConst
{
    if !value.is_finite() {
        return T::zero();
    }

    let tau_t = tau::<T>();

    let r = rem_euclid(value, tau_t);
    if r >= tau_t { T::zero() } else { r }
}

/// Full turn, `2pi`.
fn tau<T: FloatConst + Float>() -> T {
    T::PI() + T::PI()
}
