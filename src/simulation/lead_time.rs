// src/simulation/lead_time.rs

use serde::Serialize;
use tracing::{trace, warn};

use crate::error::{Result, SimError};
use crate::simulation::config::LeadTimeSpec;
use crate::simulation::rng::SimRng;

pub const MIN_LEAD_TIME_DAYS: u32 = 1;
pub const MAX_LEAD_TIME_DAYS: u32 = 90;

/// z-score of the 95th percentile of the standard normal.
const Z_95: f64 = 1.644_853_626_951_472_2;

/// Log-normal lead time solved from a target median and 95th percentile.
///
/// For a log-normal, median = exp(mu) and p95 = exp(mu + z95 * sigma), so
/// both parameters follow in closed form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogNormalLeadTime {
    pub mu: f64,
    pub sigma: f64,
}

impl LogNormalLeadTime {
    pub fn from_quantiles(median_days: f64, p95_days: f64) -> Result<Self> {
        if !median_days.is_finite() || median_days < 1.0 {
            return Err(SimError::invalid(
                "lead_time.median_days",
                format!("{median_days} must be at least 1"),
            ));
        }
        if !p95_days.is_finite() || p95_days < median_days {
            return Err(SimError::invalid(
                "lead_time.p95_days",
                format!("{p95_days} must not be below the median {median_days}"),
            ));
        }
        let mu = median_days.ln();
        let sigma = (p95_days.ln() - mu) / Z_95;
        Ok(Self { mu, sigma })
    }

    /// One lead time in whole days, clamped to [1, 90].
    pub fn sample(&self, rng: &mut SimRng) -> u32 {
        let days = rng.log_normal(self.mu, self.sigma).round();
        clamp_days(days)
    }

    pub fn median(&self) -> f64 {
        self.mu.exp()
    }
}

fn clamp_days(days: f64) -> u32 {
    if !days.is_finite() {
        warn!(days, "non-finite lead time draw, using the maximum");
        return MAX_LEAD_TIME_DAYS;
    }
    let clamped = days.clamp(f64::from(MIN_LEAD_TIME_DAYS), f64::from(MAX_LEAD_TIME_DAYS));
    if clamped != days {
        trace!(days, clamped, "lead time draw clamped");
    }
    clamped as u32
}

/// Resolves the per-order lead time for a run.
#[derive(Debug, Clone, Copy)]
pub enum LeadTimeSampler {
    Fixed(u32),
    Stochastic(LogNormalLeadTime),
}

impl LeadTimeSampler {
    pub fn from_spec(spec: &LeadTimeSpec) -> Result<Self> {
        match *spec {
            LeadTimeSpec::Fixed { days } => Ok(LeadTimeSampler::Fixed(days.max(MIN_LEAD_TIME_DAYS))),
            LeadTimeSpec::LogNormal {
                median_days,
                p95_days,
            } => Ok(LeadTimeSampler::Stochastic(LogNormalLeadTime::from_quantiles(
                median_days,
                p95_days,
            )?)),
        }
    }

    /// Fixed lead times never touch the random source.
    pub fn next(&self, rng: &mut SimRng) -> u32 {
        match self {
            LeadTimeSampler::Fixed(days) => *days,
            LeadTimeSampler::Stochastic(dist) => dist.sample(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_recover_the_quantiles() {
        let dist = LogNormalLeadTime::from_quantiles(5.0, 15.0).unwrap();
        assert!((dist.median() - 5.0).abs() < 1e-9);
        let p95 = (dist.mu + Z_95 * dist.sigma).exp();
        assert!((p95 - 15.0).abs() < 1e-9);
    }

    #[test]
    fn equal_quantiles_mean_no_spread() {
        let dist = LogNormalLeadTime::from_quantiles(4.0, 4.0).unwrap();
        let mut rng = SimRng::new(3);
        assert!((0..50).all(|_| dist.sample(&mut rng) == 4));
    }

    #[test]
    fn extreme_draws_are_clamped() {
        let dist = LogNormalLeadTime::from_quantiles(60.0, 900.0).unwrap();
        let mut rng = SimRng::new(11);
        for _ in 0..1000 {
            let days = dist.sample(&mut rng);
            assert!((MIN_LEAD_TIME_DAYS..=MAX_LEAD_TIME_DAYS).contains(&days));
        }
    }

    #[test]
    fn fixed_sampler_is_constant() {
        let sampler = LeadTimeSampler::from_spec(&LeadTimeSpec::Fixed { days: 3 }).unwrap();
        let mut rng = SimRng::new(0);
        assert_eq!(sampler.next(&mut rng), 3);
        assert_eq!(sampler.next(&mut rng), 3);
    }
}
