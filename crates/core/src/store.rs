//! Shop inventory and revenue bookkeeping.

use crate::error::RentalError;

/// Equipment on hand and money taken for a single shop.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    ski_inventory: u32,
    snowboard_inventory: u32,
    current_skis: u32,
    current_snowboards: u32,
    total_transactions: f64,
}

/// Point-in-time view of the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySnapshot {
    /// Skis available to rent.
    pub skis: u32,
    /// Snowboards available to rent.
    pub snowboards: u32,
    /// Skis owned by the shop.
    pub ski_total: u32,
    /// Snowboards owned by the shop.
    pub snowboard_total: u32,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

impl Store {
    /// Open a shop with everything on the shelf.
    pub fn new(ski_inventory: u32, snowboard_inventory: u32) -> Self {
        Self {
            ski_inventory,
            snowboard_inventory,
            current_skis: ski_inventory,
            current_snowboards: snowboard_inventory,
            total_transactions: 0.0,
        }
    }

    /// Skis currently available.
    pub fn current_skis(&self) -> u32 {
        self.current_skis
    }

    /// Snowboards currently available.
    pub fn current_snowboards(&self) -> u32 {
        self.current_snowboards
    }

    /// Sum of all final costs recorded so far.
    pub fn total_transactions(&self) -> f64 {
        self.total_transactions
    }

    /// Current shelf state.
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            skis: self.current_skis,
            snowboards: self.current_snowboards,
            ski_total: self.ski_inventory,
            snowboard_total: self.snowboard_inventory,
        }
    }

    /// Whether the requested quantities are currently on the shelf.
    pub fn can_supply(&self, skis: u32, snowboards: u32) -> bool {
        self.current_skis >= skis && self.current_snowboards >= snowboards
    }

    pub(crate) fn shortage(&self, skis: u32, snowboards: u32) -> RentalError {
        RentalError::InsufficientInventory {
            requested_skis: skis,
            requested_snowboards: snowboards,
            available_skis: self.current_skis,
            available_snowboards: self.current_snowboards,
        }
    }

    /// Take equipment off the shelf.
    pub fn check_out(&mut self, skis: u32, snowboards: u32) -> Result<(), RentalError> {
        if !self.can_supply(skis, snowboards) {
            return Err(self.shortage(skis, snowboards));
        }
        self.current_skis -= skis;
        self.current_snowboards -= snowboards;
        Ok(())
    }

    /// Put returned equipment back, never exceeding what the shop owns.
    pub fn restore(&mut self, skis: u32, snowboards: u32) {
        self.current_skis = self.current_skis.saturating_add(skis).min(self.ski_inventory);
        self.current_snowboards =
            self.current_snowboards.saturating_add(snowboards).min(self.snowboard_inventory);
    }

    /// Add a completed transaction to the running total.
    pub fn record_transaction(&mut self, amount: f64) {
        self.total_transactions += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_out_and_restore_round_trip() {
        let mut store = Store::new(10, 5);
        store.check_out(4, 5).unwrap();
        assert_eq!(store.current_skis(), 6);
        assert_eq!(store.current_snowboards(), 0);

        store.restore(4, 5);
        assert_eq!(store.snapshot(), Store::new(10, 5).snapshot());
    }

    #[test]
    fn check_out_rejects_shortage_without_side_effects() {
        let mut store = Store::new(1, 1);
        let err = store.check_out(2, 0).unwrap_err();
        assert!(matches!(
            err,
            RentalError::InsufficientInventory {
                available_skis: 1,
                ..
            }
        ));
        assert_eq!(store.current_skis(), 1);
    }

    #[test]
    fn records_transactions() {
        let mut store = Store::default();
        store.record_transaction(12.5);
        store.record_transaction(7.5);
        assert_eq!(store.total_transactions(), 20.0);
    }
}
