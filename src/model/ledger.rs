// src/model/ledger.rs

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::model::lot::{Lot, LotId};

/// Outcome of serving one day's demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Consumption {
    pub served: u32,
    /// Demand that could not be met. It is dropped, never backordered.
    pub unmet: u32,
}

/// Holds every lot of one run.
///
/// Lots live in an append-only arena and are addressed by [`LotId`]. The
/// `active` index is ordered by (expiry, arrival, id), which is exactly the
/// FEFO draw order, and doubles as the expiration lookup.
#[derive(Debug, Clone, Default)]
pub struct BatchLedger {
    arena: Vec<Lot>,
    active: BTreeSet<(u32, u32, LotId)>,
    on_hand: u64,
}

impl BatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books a delivery as a new lot. Zero-quantity deliveries create nothing.
    pub fn receive(&mut self, day: u32, quantity: u32, shelf_life_days: u32) -> Option<LotId> {
        if quantity == 0 {
            return None;
        }
        let id = LotId(self.arena.len());
        let lot = Lot::new(id, day, quantity, shelf_life_days);
        debug!(day, lot = id.0, quantity, expiry_day = lot.expiry_day, "lot received");

        self.active.insert((lot.expiry_day, lot.arrival_day, id));
        self.on_hand += u64::from(quantity);
        self.arena.push(lot);
        Some(id)
    }

    /// Writes off every lot whose expiry day has been reached.
    ///
    /// Returns the number of units expired today (zero when nothing matches).
    pub fn advance_day(&mut self, day: u32) -> u32 {
        let due: Vec<(u32, u32, LotId)> = self
            .active
            .range(..=(day, u32::MAX, LotId(usize::MAX)))
            .copied()
            .collect();

        let mut expired: u32 = 0;
        for key in due {
            self.active.remove(&key);
            let lot = &mut self.arena[key.2 .0];
            let lost = lot.quantity;
            lot.quantity = 0;
            expired = expired.saturating_add(lost);
            debug!(day, lot = key.2 .0, units = lost, "lot expired");
        }

        self.on_hand -= u64::from(expired);
        expired
    }

    /// Drains lots earliest-expiry first until `demand` is met or stock runs out.
    pub fn consume(&mut self, demand: u32) -> Consumption {
        let mut remaining = demand;
        let mut emptied = Vec::new();

        for key in self.active.iter() {
            if remaining == 0 {
                break;
            }
            let lot = &mut self.arena[key.2 .0];
            remaining -= lot.draw(remaining);
            if lot.is_depleted() {
                emptied.push(*key);
            }
        }

        for key in emptied {
            self.active.remove(&key);
        }

        let served = demand - remaining;
        self.on_hand -= u64::from(served);
        trace!(demand, served, unmet = remaining, "demand consumed");

        Consumption {
            served,
            unmet: remaining,
        }
    }

    pub fn on_hand(&self) -> u64 {
        self.on_hand
    }

    pub fn lot(&self, id: LotId) -> Option<&Lot> {
        self.arena.get(id.0)
    }

    /// Active lots in FEFO order.
    pub fn lots(&self) -> impl Iterator<Item = &Lot> + '_ {
        self.active.iter().map(move |key| &self.arena[key.2 .0])
    }

    pub fn active_lot_count(&self) -> usize {
        self.active.len()
    }

    /// Sum over active lots; equal to [`on_hand`](Self::on_hand) at all times.
    pub fn recount(&self) -> u64 {
        self.lots().map(|lot| u64::from(lot.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn expiration_only_hits_lots_due_today() {
        let mut ledger = BatchLedger::new();
        ledger.receive(0, 30, 5);
        ledger.receive(1, 40, 10);

        assert_eq!(ledger.advance_day(4), 0);
        assert_eq!(ledger.advance_day(5), 30);
        assert_eq!(ledger.on_hand(), 40);
        assert_eq!(ledger.active_lot_count(), 1);
    }

    #[test]
    fn fefo_drains_earliest_expiry_even_if_it_arrived_later() {
        let mut ledger = BatchLedger::new();
        let long_lived = ledger.receive(0, 50, 100).unwrap();
        let short_lived = ledger.receive(2, 50, 10).unwrap();

        let used = ledger.consume(60);
        assert_eq!(used, Consumption { served: 60, unmet: 0 });
        assert_eq!(ledger.lot(short_lived).unwrap().quantity, 0);
        assert_eq!(ledger.lot(long_lived).unwrap().quantity, 40);
    }

    #[test]
    fn identical_lots_are_tracked_separately() {
        let mut ledger = BatchLedger::new();
        let a = ledger.receive(3, 10, 7).unwrap();
        let b = ledger.receive(3, 10, 7).unwrap();
        assert_ne!(a, b);

        ledger.consume(10);
        assert_eq!(ledger.lot(a).unwrap().quantity, 0);
        assert_eq!(ledger.lot(b).unwrap().quantity, 10);
        assert_eq!(ledger.active_lot_count(), 1);
    }

    #[test]
    fn excess_demand_is_dropped() {
        let mut ledger = BatchLedger::new();
        ledger.receive(0, 8, 30);
        let used = ledger.consume(20);
        assert_eq!(used.served, 8);
        assert_eq!(used.unmet, 12);
        assert_eq!(ledger.on_hand(), 0);
    }

    #[test]
    fn zero_quantity_delivery_creates_no_lot() {
        let mut ledger = BatchLedger::new();
        assert!(ledger.receive(0, 0, 30).is_none());
        assert_eq!(ledger.active_lot_count(), 0);
    }

    proptest! {
        #[test]
        fn on_hand_matches_lot_sum(
            deliveries in prop::collection::vec((0u32..20, 0u32..200, 1u32..15), 1..20),
            demands in prop::collection::vec(0u32..150, 1..40),
        ) {
            let mut ledger = BatchLedger::new();
            let mut received: u64 = 0;
            let mut expired: u64 = 0;
            let mut served: u64 = 0;

            for (day, demand) in demands.iter().enumerate() {
                let day = day as u32;
                for &(_, qty, life) in deliveries.iter().filter(|d| d.0 == day) {
                    ledger.receive(day, qty, life);
                    received += u64::from(qty);
                }
                expired += u64::from(ledger.advance_day(day));
                served += u64::from(ledger.consume(*demand).served);
                prop_assert_eq!(ledger.on_hand(), ledger.recount());
            }

            prop_assert_eq!(received - expired - served, ledger.on_hand());
        }

        #[test]
        fn earliest_expiring_lot_empties_first(
            first in 1u32..100,
            second in 1u32..100,
            take_fraction in 0.0f64..1.0,
        ) {
            let mut ledger = BatchLedger::new();
            let later = ledger.receive(0, second, 20).unwrap();
            let earlier = ledger.receive(0, first, 10).unwrap();

            let take = ((f64::from(first + second)) * take_fraction) as u32;
            ledger.consume(take);

            let earliest_left = ledger.lot(earlier).unwrap().quantity;
            let later_left = ledger.lot(later).unwrap().quantity;
            if take >= first {
                prop_assert_eq!(earliest_left, 0);
                prop_assert_eq!(later_left, second - (take - first));
            } else {
                prop_assert_eq!(earliest_left, first - take);
                prop_assert_eq!(later_left, second);
            }
        }
    }
}
