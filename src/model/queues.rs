// src/model/queues.rs

use std::collections::BTreeMap;

/// Orders in transit, keyed by the day they arrive.
///
/// Unlike a fixed-delay pipe, each order may carry its own lead time, so
/// arrivals are bucketed by day and several orders landing on the same day
/// accumulate into one delivery.
#[derive(Debug, Clone, Default)]
pub struct OrderPipeline {
    by_arrival: BTreeMap<u32, u32>,
    in_transit: u64,
}

impl OrderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items enter the pipeline. Call this at the END of the day.
    pub fn schedule(&mut self, arrival_day: u32, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let slot = self.by_arrival.entry(arrival_day).or_insert(0);
        *slot = slot.saturating_add(quantity);
        self.in_transit += u64::from(quantity);
    }

    /// Items arrive at the destination. Call this at the START of the day.
    pub fn pop_arrival(&mut self, day: u32) -> u32 {
        let quantity = self.by_arrival.remove(&day).unwrap_or(0);
        self.in_transit -= u64::from(quantity);
        quantity
    }

    /// Total units ordered but not yet arrived.
    pub fn pending(&self) -> u64 {
        self.in_transit
    }

    pub fn scheduled_for(&self, day: u32) -> u32 {
        self.by_arrival.get(&day).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.by_arrival.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_arrival.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_for_the_same_day_accumulate() {
        let mut pipe = OrderPipeline::new();
        pipe.schedule(5, 100);
        pipe.schedule(5, 40);
        pipe.schedule(7, 10);

        assert_eq!(pipe.len(), 2);
        assert_eq!(pipe.scheduled_for(5), 140);
        assert_eq!(pipe.pending(), 150);
    }

    #[test]
    fn arrival_releases_only_that_day() {
        let mut pipe = OrderPipeline::new();
        pipe.schedule(3, 25);
        pipe.schedule(4, 30);

        assert_eq!(pipe.pop_arrival(2), 0);
        assert_eq!(pipe.pop_arrival(3), 25);
        assert_eq!(pipe.pop_arrival(3), 0);
        assert_eq!(pipe.pending(), 30);
    }

    #[test]
    fn zero_orders_are_ignored() {
        let mut pipe = OrderPipeline::new();
        pipe.schedule(1, 0);
        assert!(pipe.is_empty());
    }
}
