//! Common fixtures for slice plotting tests.

/// Basis names used by the generated datasets.
pub mod bases {
    pub const X: &str = "x";
    pub const Z: &str = "z";
    pub const PHI: &str = "phi";
    pub const THETA: &str = "theta";
    pub const R: &str = "r";
}

/// Radial bounds for disk, ball and shell panels.
pub mod radii {
    /// Unit disk (polar defaults)
    pub const UNIT: (f64, f64) = (0.0, 1.0);

    /// Ball/shell interface and outer shell radius
    pub const BALL_SHELL: (f64, f64) = (1.0, 1.5);
}

/// Small deterministic value distributions for color limit checks.
pub mod distributions {
    /// 1000 values 1..=1000; the 0.2/99.8 percentile indices are 2 and 998.
    pub fn ramp_1000() -> Vec<f64> {
        (1..=1000).map(|v| v as f64).collect()
    }

    /// Symmetric around zero with a single large outlier.
    pub fn signed_with_outlier() -> Vec<f64> {
        let mut values: Vec<f64> = (-499..=499).map(|v| v as f64).collect();
        values.push(1.0e6);
        values
    }

    /// Mostly negative values.
    pub fn negative_ramp() -> Vec<f64> {
        (1..=1000).map(|v| -(v as f64)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_lengths() {
        assert_eq!(distributions::ramp_1000().len(), 1000);
        assert_eq!(distributions::signed_with_outlier().len(), 1000);
        assert_eq!(distributions::negative_ramp().len(), 1000);
    }
}
