use crate::TimeStep;
use gcd::Gcd;

/// `None` when the result does not fit in a `TimeStep`.
pub fn lcm(a: TimeStep, b: TimeStep) -> Option<TimeStep> {
    (a / a.gcd(b)).checked_mul(b)
}

/// Least common multiple of every value, `Some(1)` for an empty slice.
pub fn multiple_lcm(numbers: &[TimeStep]) -> Option<TimeStep> {
    numbers.iter().try_fold(1, |acc, &x| lcm(acc, x))
}

/// Greatest common divisor of every value, `0` for an empty slice.
pub fn multiple_gcd(numbers: &[TimeStep]) -> TimeStep {
    numbers.iter().fold(0, |acc: TimeStep, &x| acc.gcd(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_lcm() {
        assert_eq!(multiple_lcm(&[6, 12, 18, 24]), Some(72));
        assert_eq!(multiple_lcm(&[12]), Some(12));
        assert_eq!(multiple_lcm(&[]), Some(1));
    }

    #[test]
    fn test_lcm_overflow() {
        assert_eq!(lcm(4_294_967_311, 4_294_967_357), None);
        assert_eq!(multiple_lcm(&[6, 4_294_967_311, 4_294_967_357]), None);
    }

    #[test]
    fn test_multiple_gcd() {
        assert_eq!(multiple_gcd(&[6, 12, 18, 24]), 6);
        assert_eq!(multiple_gcd(&[12, 24]), 12);
        assert_eq!(multiple_gcd(&[]), 0);
    }
}
