// src/model/lot.rs

use serde::Serialize;

/// Stable handle into the ledger's lot arena.
///
/// Ids are handed out in arrival order and never reused within a run, so two
/// lots with identical attributes remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LotId(pub usize);

/// A dated quantity of stock that arrived on one day and expires on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lot {
    pub id: LotId,
    pub arrival_day: u32,
    pub expiry_day: u32,
    pub quantity: u32,
}

impl Lot {
    pub fn new(id: LotId, arrival_day: u32, quantity: u32, shelf_life_days: u32) -> Self {
        Self {
            id,
            arrival_day,
            expiry_day: arrival_day.saturating_add(shelf_life_days),
            quantity,
        }
    }

    /// Takes up to `wanted` units out of the lot. Returns what was taken.
    pub fn draw(&mut self, wanted: u32) -> u32 {
        let taken = wanted.min(self.quantity);
        self.quantity -= taken;
        taken
    }

    pub fn is_depleted(&self) -> bool {
        self.quantity == 0
    }

    /// Days left before the lot is written off, seen from `day`.
    pub fn remaining_life(&self, day: u32) -> u32 {
        self.expiry_day.saturating_sub(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_arrival_plus_shelf_life() {
        let lot = Lot::new(LotId(0), 3, 50, 20);
        assert_eq!(lot.expiry_day, 23);
        assert_eq!(lot.remaining_life(10), 13);
        assert_eq!(lot.remaining_life(30), 0);
    }

    #[test]
    fn draw_never_overdraws() {
        let mut lot = Lot::new(LotId(1), 0, 5, 10);
        assert_eq!(lot.draw(3), 3);
        assert_eq!(lot.draw(10), 2);
        assert!(lot.is_depleted());
        assert_eq!(lot.draw(1), 0);
    }
}
