//! Rental lifecycle: start, cost calculation, discounts and return.

pub mod pricing;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::{
    error::RentalError,
    models::{Customer, RentalType},
    store::Store,
};

pub use pricing::Quote;

/// Equipment handed to a customer under one billing tier.
///
/// A rental is created when the equipment leaves the shelf. At return
/// time its cost is calculated, discounts are applied in place, the final
/// cost is booked on the store, and the held quantities drop to zero.
#[derive(Debug, Clone)]
pub struct Rental {
    customer: Customer,
    rental_type: RentalType,
    skis: u32,
    snowboards: u32,
    started_at: NaiveDateTime,
    subtotal: Option<f64>,
    cost: Option<f64>,
    final_cost: Option<f64>,
}

/// Result of settling a returned rental.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Time between start and return.
    pub elapsed: Duration,
    /// Tier billed after promotion.
    pub billed_type: RentalType,
    /// Units of `billed_type` billed.
    pub billed_units: u32,
    /// Cost before discounts.
    pub subtotal: f64,
    /// Whether the family discount was applied.
    pub family_discount: bool,
    /// Whether the discount code was accepted.
    pub code_discount: bool,
    /// Amount charged and recorded on the store.
    pub final_cost: f64,
}

impl Rental {
    /// Take equipment off the store's shelf for `customer`.
    pub fn start(
        mut customer: Customer,
        store: &mut Store,
        skis: u32,
        snowboards: u32,
        rental_type: RentalType,
        started_at: NaiveDateTime,
    ) -> Result<Self, RentalError> {
        if skis == 0 && snowboards == 0 {
            return Err(RentalError::EmptyRequest);
        }
        customer.request_equipment(skis, snowboards, store)?;
        store.check_out(skis, snowboards)?;
        Ok(Self {
            customer,
            rental_type,
            skis,
            snowboards,
            started_at,
            subtotal: None,
            cost: None,
            final_cost: None,
        })
    }

    /// Build a rental that only serves to price a request.
    ///
    /// Nothing is taken from any store.
    pub fn placeholder(
        skis: u32,
        snowboards: u32,
        rental_type: RentalType,
        started_at: NaiveDateTime,
    ) -> Self {
        Self {
            customer: Customer::placeholder(),
            rental_type,
            skis,
            snowboards,
            started_at,
            subtotal: None,
            cost: None,
            final_cost: None,
        }
    }

    /// Price `period` units of this rental's tier.
    pub fn estimate(&self, period: u32) -> Quote {
        pricing::estimate(self.rental_type, period, self.skis, self.snowboards)
    }

    /// Customer holding the equipment.
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Tier chosen when the rental started.
    pub fn rental_type(&self) -> RentalType {
        self.rental_type
    }

    /// Skis currently held.
    pub fn skis(&self) -> u32 {
        self.skis
    }

    /// Snowboards currently held.
    pub fn snowboards(&self) -> u32 {
        self.snowboards
    }

    /// Start of the rental.
    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    /// Cost before discounts, once calculated.
    pub fn subtotal(&self) -> Option<f64> {
        self.subtotal
    }

    /// Amount charged, once finalised.
    pub fn final_cost(&self) -> Option<f64> {
        self.final_cost
    }

    /// Whether the equipment has already come back.
    pub fn is_returned(&self) -> bool {
        self.final_cost.is_some()
    }

    /// Compute the undiscounted cost for a return at `returned_at`.
    pub fn calculate_cost(
        &mut self,
        returned_at: NaiveDateTime,
    ) -> Result<(RentalType, u32), RentalError> {
        if returned_at < self.started_at {
            return Err(RentalError::ReturnBeforeStart {
                started_at: self.started_at,
                returned_at,
            });
        }
        let (tier, units) =
            pricing::billed_for_elapsed(self.rental_type, returned_at - self.started_at);
        let subtotal = pricing::price(tier, units, self.skis, self.snowboards);
        debug!(%tier, units, subtotal, "rental cost calculated");
        self.subtotal = Some(subtotal);
        self.cost = Some(subtotal);
        Ok((tier, units))
    }

    /// Apply the family discount if the party size qualifies.
    pub fn apply_family_discount(&mut self) -> bool {
        if !pricing::family_discount_applies(self.skis.saturating_add(self.snowboards)) {
            return false;
        }
        match self.cost.as_mut() {
            Some(cost) => {
                *cost *= pricing::FAMILY_DISCOUNT_FACTOR;
                true
            }
            None => false,
        }
    }

    /// Apply a discount code if it is valid.
    pub fn apply_discount_code(&mut self, code: &str) -> bool {
        if !pricing::discount_code_applies(code) {
            return false;
        }
        match self.cost.as_mut() {
            Some(cost) => {
                *cost *= pricing::CODE_DISCOUNT_FACTOR;
                true
            }
            None => false,
        }
    }

    /// Fix the final cost and add it to the store's transaction total.
    fn finalize(&mut self, store: &mut Store) -> Result<f64, RentalError> {
        if self.is_returned() {
            return Err(RentalError::AlreadyReturned);
        }
        let cost = self.cost.ok_or(RentalError::CostNotCalculated)?;
        let final_cost = pricing::round_cents(cost);
        store.record_transaction(final_cost);
        self.final_cost = Some(final_cost);
        Ok(final_cost)
    }

    /// Put the held equipment back on the store's shelf.
    fn return_equipment(&mut self, store: &mut Store) {
        store.restore(self.skis, self.snowboards);
        self.skis = 0;
        self.snowboards = 0;
        self.customer.skis = 0;
        self.customer.snowboards = 0;
    }

    /// Run the whole return: cost, discounts, booking and restock.
    pub fn settle(
        &mut self,
        store: &mut Store,
        returned_at: NaiveDateTime,
        discount_code: &str,
    ) -> Result<Settlement, RentalError> {
        if self.is_returned() {
            return Err(RentalError::AlreadyReturned);
        }
        let (billed_type, billed_units) = self.calculate_cost(returned_at)?;
        let subtotal = self.subtotal.unwrap_or_default();
        let family_discount = self.apply_family_discount();
        let code_discount = self.apply_discount_code(discount_code);
        let final_cost = self.finalize(store)?;
        self.return_equipment(store);

        Ok(Settlement {
            elapsed: returned_at - self.started_at,
            billed_type,
            billed_units,
            subtotal,
            family_discount,
            code_discount,
            final_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    fn start(store: &mut Store, skis: u32, boards: u32, tier: RentalType) -> Rental {
        Rental::start(
            Customer::new("John", "1"),
            store,
            skis,
            boards,
            tier,
            at(10, 9, 0),
        )
        .expect("rental should start")
    }

    #[test]
    fn start_takes_equipment_off_the_shelf() {
        let mut store = Store::new(10, 10);
        let rental = start(&mut store, 2, 3, RentalType::Daily);
        assert_eq!(store.current_skis(), 8);
        assert_eq!(store.current_snowboards(), 7);
        assert_eq!(rental.customer().equipment_count(), 5);
    }

    #[test]
    fn start_rejects_empty_and_oversized_requests() {
        let mut store = Store::new(1, 1);
        let empty = Rental::start(
            Customer::new("A", "1"),
            &mut store,
            0,
            0,
            RentalType::Hourly,
            at(10, 9, 0),
        );
        assert_eq!(empty.unwrap_err(), RentalError::EmptyRequest);

        let too_many = Rental::start(
            Customer::new("A", "1"),
            &mut store,
            2,
            0,
            RentalType::Hourly,
            at(10, 9, 0),
        );
        assert!(matches!(
            too_many,
            Err(RentalError::InsufficientInventory { .. })
        ));
        assert_eq!(store.snapshot(), Store::new(1, 1).snapshot());
    }

    #[test]
    fn placeholder_estimates_without_touching_inventory() {
        let rental = Rental::placeholder(1, 1, RentalType::Hourly, at(10, 9, 0));
        assert_eq!(rental.customer().name, "Estimate");
        assert_eq!(rental.estimate(5).amount, 90.0);
        assert_eq!(rental.estimate(2).amount, 50.0);
    }

    #[test]
    fn settle_applies_both_discounts_and_books_revenue() {
        let mut store = Store::new(10, 10);
        let mut rental = start(&mut store, 2, 1, RentalType::Hourly);

        let settlement = rental
            .settle(&mut store, at(10, 11, 0), "abcBBP")
            .expect("settles");
        assert_eq!(settlement.billed_type, RentalType::Hourly);
        assert_eq!(settlement.billed_units, 2);
        assert_eq!(settlement.subtotal, 2.0 * (2.0 * 15.0 + 10.0));
        assert!(settlement.family_discount);
        assert!(settlement.code_discount);
        assert_eq!(settlement.final_cost, 54.0);
        assert_eq!(store.total_transactions(), settlement.final_cost);
    }

    #[test]
    fn settle_skips_discounts_outside_the_rules() {
        let mut store = Store::new(10, 10);
        let mut rental = start(&mut store, 1, 1, RentalType::Daily);

        let settlement = rental
            .settle(&mut store, at(12, 9, 0), "abBBP")
            .expect("settles");
        assert_eq!(settlement.billed_units, 2);
        assert!(!settlement.family_discount);
        assert!(!settlement.code_discount);
        assert_eq!(settlement.final_cost, 2.0 * 90.0);
    }

    #[test]
    fn return_restores_store_and_zeroes_held_quantities() {
        let mut store = Store::new(6, 4);
        let before = store.snapshot();
        let mut rental = start(&mut store, 3, 2, RentalType::Weekly);

        rental
            .settle(&mut store, at(20, 9, 0), "")
            .expect("settles");
        assert_eq!(store.snapshot(), before);
        assert_eq!((rental.skis(), rental.snowboards()), (0, 0));
        assert_eq!(rental.customer().equipment_count(), 0);
        assert_eq!(
            rental.settle(&mut store, at(21, 9, 0), ""),
            Err(RentalError::AlreadyReturned)
        );
    }

    #[test]
    fn finalize_books_revenue_only_once_and_only_after_pricing() {
        let mut store = Store::new(5, 5);
        let mut rental = start(&mut store, 1, 0, RentalType::Hourly);

        assert_eq!(
            rental.finalize(&mut store),
            Err(RentalError::CostNotCalculated)
        );
        assert!(!rental.is_returned());
        assert_eq!(store.total_transactions(), 0.0);

        rental.calculate_cost(at(10, 10, 0)).expect("priced");
        assert_eq!(rental.finalize(&mut store), Ok(15.0));
        assert_eq!(rental.finalize(&mut store), Err(RentalError::AlreadyReturned));
        assert_eq!(store.total_transactions(), 15.0);
    }

    #[test]
    fn return_before_start_is_rejected_without_side_effects() {
        let mut store = Store::new(5, 5);
        let mut rental = start(&mut store, 1, 0, RentalType::Hourly);
        let err = rental.settle(&mut store, at(9, 9, 0), "").unwrap_err();
        assert!(matches!(err, RentalError::ReturnBeforeStart { .. }));
        assert_eq!(store.current_skis(), 4);
        assert_eq!(store.total_transactions(), 0.0);
        assert!(!rental.is_returned());
    }
}
