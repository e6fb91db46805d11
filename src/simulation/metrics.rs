// src/simulation/metrics.rs

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulation::engine::DailySeries;

/// Which days count towards the headline stockout rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockoutBasis {
    /// Only days with positive demand; a zero-demand day cannot stock out.
    #[default]
    DemandDays,
    /// Every simulated day.
    AllDays,
}

/// Run-level waste and service statistics. Rates are in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub stockout_rate: f64,
    pub stockout_rate_all_days: f64,
    pub stockout_days: usize,
    pub max_consecutive_stockout: usize,
    pub expired_units_total: u64,
    pub expired_rate: f64,
    pub avg_non_expired_inventory: f64,
    pub non_expired_negative_days: usize,
    pub total_days: usize,
    pub days_with_usage: usize,
    pub consumed_units_total: u64,
    pub unmet_units_total: u64,
    pub ordered_units_total: u64,
}

impl SummaryMetrics {
    pub fn from_series(series: &DailySeries, basis: StockoutBasis) -> Self {
        let records = series.records();
        let total_days = records.len();

        let empty_days: Vec<bool> = records.iter().map(|r| r.non_expired_inventory <= 0).collect();
        let days_with_usage = records.iter().filter(|r| r.demand > 0).count();
        let demand_day_stockouts = records
            .iter()
            .filter(|r| r.non_expired_inventory <= 0 && r.demand > 0)
            .count();
        let all_day_stockouts = empty_days.iter().filter(|e| **e).count();

        let (stockout_days, denominator) = match basis {
            StockoutBasis::DemandDays => (demand_day_stockouts, days_with_usage),
            StockoutBasis::AllDays => (all_day_stockouts, total_days),
        };

        let mut max_streak = 0;
        let mut streak = 0;
        for empty in &empty_days {
            if *empty {
                streak += 1;
                max_streak = max_streak.max(streak);
            } else {
                streak = 0;
            }
        }

        let expired: u64 = records.iter().map(|r| u64::from(r.expired_today)).sum();
        let consumed: u64 = records.iter().map(|r| u64::from(r.consumed)).sum();
        let unmet: u64 = records.iter().map(|r| u64::from(r.unmet)).sum();
        let ordered: u64 = records.iter().map(|r| u64::from(r.ordered_today)).sum();
        let inventory_sum: i64 = records.iter().map(|r| r.non_expired_inventory).sum();

        Self {
            stockout_rate: percent(stockout_days, denominator),
            stockout_rate_all_days: percent(all_day_stockouts, total_days),
            stockout_days,
            max_consecutive_stockout: max_streak,
            expired_units_total: expired,
            expired_rate: if expired + consumed > 0 {
                expired as f64 / (expired + consumed) as f64 * 100.0
            } else {
                0.0
            },
            avg_non_expired_inventory: if total_days > 0 {
                inventory_sum as f64 / total_days as f64
            } else {
                0.0
            },
            non_expired_negative_days: records.iter().filter(|r| r.non_expired_inventory < 0).count(),
            total_days,
            days_with_usage,
            consumed_units_total: consumed,
            unmet_units_total: unmet,
            ordered_units_total: ordered,
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Point-forecast accuracy against actual demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error over days with actual demand of at least one unit.
    pub mape: Option<f64>,
    pub mape_count: usize,
    pub total_samples: usize,
}

impl ForecastAccuracy {
    /// Non-finite forecast values are skipped.
    pub fn compute(actual: &[u32], forecast: &[f64]) -> Result<Self> {
        if actual.len() != forecast.len() {
            return Err(SimError::ForecastLengthMismatch {
                expected: actual.len(),
                actual: forecast.len(),
            });
        }

        let pairs: Vec<(f64, f64)> = actual
            .iter()
            .zip(forecast)
            .filter(|(_, f)| f.is_finite())
            .map(|(&a, &f)| (f64::from(a), f))
            .collect();

        if pairs.is_empty() {
            return Ok(Self {
                mae: f64::NAN,
                rmse: f64::NAN,
                mape: None,
                mape_count: 0,
                total_samples: 0,
            });
        }

        let n = pairs.len() as f64;
        let mae = pairs.iter().map(|(a, f)| (a - f).abs()).sum::<f64>() / n;
        let rmse = (pairs.iter().map(|(a, f)| (a - f).powi(2)).sum::<f64>() / n).sqrt();

        let pct: Vec<f64> = pairs
            .iter()
            .filter(|(a, _)| *a >= 1.0)
            .map(|(a, f)| ((a - f) / a).abs())
            .collect();
        let mape = if pct.is_empty() {
            None
        } else {
            Some(pct.iter().sum::<f64>() / pct.len() as f64 * 100.0)
        };

        Ok(Self {
            mae,
            rmse,
            mape,
            mape_count: pct.len(),
            total_samples: pairs.len(),
        })
    }
}
