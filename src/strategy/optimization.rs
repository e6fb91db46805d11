// src/strategy/optimization.rs

//! Replenishment arithmetic shared by the ordering policies.
//!
//! Demand rates, coverage and par levels are computed in floating point and
//! only turned into whole units at the very end, by [`round_to_pack`].

/// Guard for divisions by a demand rate that may legitimately be zero.
pub const EPSILON: f64 = 1e-6;

/// Safety buffer (days) added on top of par days and lead time.
pub const PAR_SAFETY_BUFFER_DAYS: u32 = 7;

/// Extra days covering demand variability in the par level.
pub const PAR_VARIABILITY_BUFFER_DAYS: u32 = 7;

/// Rounds an order up to the supplier's pack constraints.
///
/// The quantity is first raised to the next multiple of the minimum order
/// quantity, then to the next multiple of the standard pack quantity. A zero
/// need stays zero.
pub fn round_to_pack(quantity: u32, moq: Option<u32>, spq: Option<u32>) -> u32 {
    if quantity == 0 {
        return 0;
    }
    let mut rounded = quantity;
    if let Some(moq) = moq.filter(|m| *m > 0) {
        rounded = round_up_to_multiple(rounded, moq);
    }
    if let Some(spq) = spq.filter(|s| *s > 0) {
        rounded = round_up_to_multiple(rounded, spq);
    }
    rounded
}

fn round_up_to_multiple(quantity: u32, multiple: u32) -> u32 {
    quantity.div_ceil(multiple).saturating_mul(multiple)
}

/// Converts a fractional need into whole units, never negative.
pub fn whole_units(quantity: f64) -> u32 {
    if !quantity.is_finite() || quantity <= 0.0 {
        return 0;
    }
    quantity.ceil().min(f64::from(u32::MAX)) as u32
}

/// Target stock-plus-pipeline for par-driven replenishment, in units.
///
/// Formula: avg_daily_usage * (par_days + lead_time + safety + variability)
pub fn par_level(avg_daily_usage: f64, par_days: u32, median_lead_time: u32) -> f64 {
    let days = par_days + median_lead_time + PAR_SAFETY_BUFFER_DAYS + PAR_VARIABILITY_BUFFER_DAYS;
    avg_daily_usage.max(0.0) * f64::from(days)
}

/// How many days `units` last at `daily_rate`.
pub fn days_of_coverage(units: f64, daily_rate: f64) -> f64 {
    units.max(0.0) / daily_rate.max(EPSILON)
}

/// Average daily usage over the recent past.
///
/// Uses the last 14 days when that much history exists, otherwise the last
/// 7, otherwise the long-run average.
pub fn recent_consumption(history: &[u32], long_run_average: f64) -> f64 {
    for window in [14usize, 7] {
        if history.len() >= window {
            let tail = &history[history.len() - window..];
            let total: u64 = tail.iter().map(|&u| u64::from(u)).sum();
            return total as f64 / window as f64;
        }
    }
    long_run_average.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(130, Some(200), Some(25), 200)]
    #[case(210, Some(200), Some(25), 400)]
    #[case(130, None, Some(25), 150)]
    #[case(130, Some(100), None, 200)]
    #[case(130, Some(60), Some(25), 200)]
    #[case(130, None, None, 130)]
    #[case(0, Some(200), Some(25), 0)]
    fn pack_rounding(
        #[case] need: u32,
        #[case] moq: Option<u32>,
        #[case] spq: Option<u32>,
        #[case] expected: u32,
    ) {
        assert_eq!(round_to_pack(need, moq, spq), expected);
    }

    #[test]
    fn par_level_adds_both_buffers() {
        // 10/day * (15 + 3 + 7 + 7)
        assert_eq!(par_level(10.0, 15, 3), 320.0);
    }

    #[test]
    fn coverage_with_zero_rate_is_finite() {
        let coverage = days_of_coverage(5.0, 0.0);
        assert!(coverage.is_finite());
        assert!(coverage > 1e5);
    }

    #[test]
    fn recent_consumption_falls_back_by_history_length() {
        let long: Vec<u32> = (0..20).map(|d| if d < 6 { 100 } else { 10 }).collect();
        assert_eq!(recent_consumption(&long, 50.0), 10.0);

        let medium = vec![2, 2, 2, 2, 2, 2, 2, 2, 2];
        assert_eq!(recent_consumption(&medium, 50.0), 2.0);

        assert_eq!(recent_consumption(&[1, 2, 3], 4.5), 4.5);
    }

    #[test]
    fn whole_units_rounds_up_and_clamps() {
        assert_eq!(whole_units(12.1), 13);
        assert_eq!(whole_units(-3.0), 0);
        assert_eq!(whole_units(f64::NAN), 0);
    }
}
