//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

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
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(1f64, 4f64), 1f64);
        assert_eq!(rem_euclid(5f64, 4f64), 1f64);
        assert_eq!(rem_euclid(-1f64, 4f64), 3f64);
        assert_eq!(rem_euclid(-5f64, 4f64), 3f64);

        // Wrapping a distance query into a track length
        assert_eq!(rem_euclid(7.5f64, 2.5f64), 0f64);
        assert!((rem_euclid(-0.25f64, 2.5f64) - 2.25f64).abs() < 1e-12);
    }
}
