//! Cartesian / polar conversion

/// Cartesian to polar, returns `(theta, rho)`
#[inline]
#[must_use]
pub fn cart2pol(x: f64, y: f64) -> (f64, f64) {
    (y.atan2(x), x.hypot(y))
}

/// Polar to cartesian, returns `(x, y)`
#[inline]
#[must_use]
pub fn pol2cart(theta: f64, rho: f64) -> (f64, f64) {
    (rho * theta.cos(), rho * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn unit_vectors() {
        let (theta, rho) = cart2pol(0.0, 2.0);
        assert!((theta - FRAC_PI_2).abs() < 1e-12);
        assert!((rho - 2.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_pair() {
        let (theta, rho) = cart2pol(-3.0, 4.0);
        let (x, y) = pol2cart(theta, rho);
        assert!((x + 3.0).abs() < 1e-12);
        assert!((y - 4.0).abs() < 1e-12);
    }
}
