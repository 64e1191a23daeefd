//! Front counter: active rental registry and the documents handed out.

use std::{collections::HashMap, fmt};

use chrono::{Duration, NaiveDateTime};
use tracing::{info, warn};

use crate::{
    clock,
    error::RentalError,
    models::{Customer, RentalType},
    rental::{Quote, Rental, Settlement},
    store::{InventorySnapshot, Store},
};

/// Everything needed to open a rental.
#[derive(Debug, Clone)]
pub struct NewRental {
    /// Registry key for the customer.
    pub customer_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// Skis to hand out.
    pub skis: u32,
    /// Snowboards to hand out.
    pub snowboards: u32,
    /// Billing tier.
    pub rental_type: RentalType,
    /// When the equipment leaves the shop.
    pub started_at: NaiveDateTime,
    /// Discount code to apply at return; may be empty.
    pub discount_code: String,
}

/// A rental that has not been returned yet.
#[derive(Debug, Clone)]
pub struct ActiveRental {
    rental: Rental,
    skis: u32,
    snowboards: u32,
    discount_code: String,
}

impl ActiveRental {
    /// Customer holding the equipment.
    pub fn customer(&self) -> &Customer {
        self.rental.customer()
    }

    /// The underlying rental.
    pub fn rental(&self) -> &Rental {
        &self.rental
    }

    /// Tier chosen at rental time.
    pub fn rental_type(&self) -> RentalType {
        self.rental.rental_type()
    }

    /// Skis handed out.
    pub fn skis(&self) -> u32 {
        self.skis
    }

    /// Snowboards handed out.
    pub fn snowboards(&self) -> u32 {
        self.snowboards
    }

    /// Code entered when the rental was opened.
    pub fn discount_code(&self) -> &str {
        &self.discount_code
    }
}

/// Owns the store and tracks which customers currently hold equipment.
#[derive(Debug)]
pub struct RentalDesk {
    store: Store,
    active: HashMap<String, ActiveRental>,
    daily_skis: u32,
    daily_snowboards: u32,
}

impl RentalDesk {
    /// Open the counter for `store`.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            active: HashMap::new(),
            daily_skis: 0,
            daily_snowboards: 0,
        }
    }

    /// Shop backing this desk.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Open rental for `customer_id`, if any.
    pub fn active_rental(&self, customer_id: &str) -> Option<&ActiveRental> {
        self.active.get(customer_id)
    }

    /// Number of open rentals.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Price a request without reserving anything.
    pub fn estimate(
        &self,
        skis: u32,
        snowboards: u32,
        rental_type: RentalType,
        period: u32,
        discount_code: &str,
    ) -> Estimate {
        let rental = Rental::placeholder(skis, snowboards, rental_type, clock::now());
        Estimate {
            skis,
            snowboards,
            discount_code: discount_code.to_string(),
            quote: rental.estimate(period),
        }
    }

    /// Whether the shelf can cover the request right now.
    pub fn is_inventory_sufficient(&self, skis: u32, snowboards: u32) -> bool {
        self.store.can_supply(skis, snowboards)
    }

    /// Whether `customer_id` is free to open a rental.
    pub fn is_customer_id_available(&self, customer_id: &str) -> bool {
        !self.active.contains_key(customer_id)
    }

    /// Hand out equipment and register the rental.
    pub fn open_rental(&mut self, request: NewRental) -> Result<OrderSummary, RentalError> {
        if !self.is_customer_id_available(&request.customer_id) {
            warn!(customer_id = %request.customer_id, "customer already holds a rental");
            return Err(RentalError::CustomerAlreadyRenting(request.customer_id));
        }

        let customer = Customer::new(request.customer_name, request.customer_id.clone());
        let rental = Rental::start(
            customer,
            &mut self.store,
            request.skis,
            request.snowboards,
            request.rental_type,
            request.started_at,
        )
        .inspect_err(|err| warn!(customer_id = %request.customer_id, %err, "rental rejected"))?;

        self.daily_skis = self.daily_skis.saturating_add(request.skis);
        self.daily_snowboards = self.daily_snowboards.saturating_add(request.snowboards);

        let summary = OrderSummary {
            customer_id: request.customer_id.clone(),
            customer_name: rental.customer().name.clone(),
            skis: request.skis,
            snowboards: request.snowboards,
            rental_type: request.rental_type,
            started_at: request.started_at,
            discount_code: request.discount_code.clone(),
        };
        info!(
            customer_id = %summary.customer_id,
            skis = summary.skis,
            snowboards = summary.snowboards,
            rental_type = %summary.rental_type,
            "rental opened"
        );

        self.active.insert(
            request.customer_id,
            ActiveRental {
                rental,
                skis: request.skis,
                snowboards: request.snowboards,
                discount_code: request.discount_code,
            },
        );
        Ok(summary)
    }

    /// Take equipment back, bill the customer and close the rental.
    ///
    /// The rental stays registered if settling fails.
    pub fn return_rental(
        &mut self,
        customer_id: &str,
        returned_at: NaiveDateTime,
    ) -> Result<ReturnInvoice, RentalError> {
        let Some(entry) = self.active.get_mut(customer_id) else {
            warn!(customer_id, "return for unknown customer");
            return Err(RentalError::UnknownCustomer(customer_id.to_string()));
        };

        let settlement = entry
            .rental
            .settle(&mut self.store, returned_at, &entry.discount_code)?;

        let entry = self
            .active
            .remove(customer_id)
            .ok_or_else(|| RentalError::UnknownCustomer(customer_id.to_string()))?;
        info!(customer_id, final_cost = settlement.final_cost, "rental returned");

        Ok(ReturnInvoice {
            customer_name: entry.customer().name.clone(),
            skis: entry.skis,
            snowboards: entry.snowboards,
            settlement,
        })
    }

    /// Equipment currently on the shelf.
    pub fn inventory(&self) -> InventorySnapshot {
        self.store.snapshot()
    }

    /// Totals for the end-of-day report.
    pub fn day_report(&self) -> DayReport {
        DayReport {
            skis_rented: self.daily_skis,
            snowboards_rented: self.daily_snowboards,
            revenue: self.store.total_transactions(),
            open_rentals: self.active.len(),
        }
    }
}

/// Printed quote for a prospective rental.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Skis requested.
    pub skis: u32,
    /// Snowboards requested.
    pub snowboards: u32,
    /// Code the customer mentioned.
    pub discount_code: String,
    /// Pricing detail.
    pub quote: Quote,
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = &self.quote;
        writeln!(f, "--- Order Estimate ---")?;
        writeln!(f, "Skis: {}", self.skis)?;
        writeln!(f, "Snowboards: {}", self.snowboards)?;
        writeln!(f, "Rental Type: {}", quote.requested_type)?;
        writeln!(
            f,
            "Period: {}",
            quote.requested_type.describe_period(quote.requested_period)
        )?;
        if quote.billed_type != quote.requested_type {
            writeln!(
                f,
                "Billed As: {} ({})",
                quote.billed_type,
                quote.billed_type.describe_period(quote.billed_period)
            )?;
        }
        writeln!(f, "Discount Code: {}", self.discount_code)?;
        write!(f, "Estimated Cost: ${:.2}", quote.amount)
    }
}

/// Receipt handed out when a rental starts.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    /// Registry key.
    pub customer_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// Skis handed out.
    pub skis: u32,
    /// Snowboards handed out.
    pub snowboards: u32,
    /// Billing tier.
    pub rental_type: RentalType,
    /// Start of the rental.
    pub started_at: NaiveDateTime,
    /// Code to apply at return.
    pub discount_code: String,
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order Summary")?;
        writeln!(f, "Customer: {} (ID {})", self.customer_name, self.customer_id)?;
        writeln!(f, "Skis: {}", self.skis)?;
        writeln!(f, "Snowboards: {}", self.snowboards)?;
        writeln!(f, "Rental Type: {}", self.rental_type)?;
        writeln!(f, "Started: {}", clock::format_timestamp(self.started_at))?;
        write!(f, "Discount Code: {}", self.discount_code)
    }
}

/// Invoice handed out when equipment comes back.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnInvoice {
    /// Customer display name.
    pub customer_name: String,
    /// Skis returned.
    pub skis: u32,
    /// Snowboards returned.
    pub snowboards: u32,
    /// Billing detail.
    pub settlement: Settlement,
}

impl ReturnInvoice {
    /// Final amount charged.
    pub fn final_cost(&self) -> f64 {
        self.settlement.final_cost
    }
}

impl fmt::Display for ReturnInvoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settlement = &self.settlement;
        writeln!(f, "RENTAL RETURN INVOICE")?;
        writeln!(f, "Customer Name: {}", self.customer_name)?;
        writeln!(f, "Equipment Rented:")?;
        writeln!(f, "  Skis: {}", self.skis)?;
        writeln!(f, "  Snowboards: {}", self.snowboards)?;
        writeln!(f, "Duration: {}", format_duration(settlement.elapsed))?;
        writeln!(
            f,
            "Billed: {} ({})",
            settlement.billed_type,
            settlement
                .billed_type
                .describe_period(settlement.billed_units)
        )?;
        writeln!(f, "Subtotal: ${:.2}", settlement.subtotal)?;
        if settlement.family_discount {
            writeln!(f, "Family discount: 25% off")?;
        }
        if settlement.code_discount {
            writeln!(f, "Discount code: 10% off")?;
        }
        write!(f, "Final Total: ${:.2}", settlement.final_cost)
    }
}

/// End-of-day totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayReport {
    /// Skis handed out today.
    pub skis_rented: u32,
    /// Snowboards handed out today.
    pub snowboards_rented: u32,
    /// Money collected from returned rentals.
    pub revenue: f64,
    /// Rentals still out.
    pub open_rentals: usize,
}

impl fmt::Display for DayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(30);
        writeln!(f, "END OF DAY REPORT")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total Skis Rented Today: {}", self.skis_rented)?;
        writeln!(f, "Total Snowboards Rented Today: {}", self.snowboards_rented)?;
        writeln!(f, "Total Revenue Collected: ${:.2}", self.revenue)?;
        if self.open_rentals > 0 {
            writeln!(f, "Rentals Still Out: {}", self.open_rentals)?;
        }
        write!(f, "{rule}")
    }
}

fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{days} days, {hours} hours, {minutes} minutes, {seconds} seconds")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn request(id: &str, skis: u32, snowboards: u32, code: &str) -> NewRental {
        NewRental {
            customer_id: id.to_string(),
            customer_name: format!("Customer {id}"),
            skis,
            snowboards,
            rental_type: RentalType::Hourly,
            started_at: at(1, 9),
            discount_code: code.to_string(),
        }
    }

    #[test]
    fn estimate_promotes_hourly_to_daily() {
        let desk = RentalDesk::new(Store::new(10, 10));
        let estimate = desk.estimate(3, 2, RentalType::Hourly, 5, "abcBBP");
        assert_eq!(estimate.quote.billed_type, RentalType::Daily);
        assert_eq!(estimate.quote.billed_period, 1);
        assert_eq!(estimate.quote.amount, 3.0 * 50.0 + 2.0 * 40.0);
        assert_eq!(desk.inventory().skis, 10);

        let text = estimate.to_string();
        assert!(text.contains("Period: 5 Hours"));
        assert!(text.contains("Estimated Cost: $230.00"));
    }

    #[test]
    fn one_open_rental_per_customer() {
        let mut desk = RentalDesk::new(Store::new(10, 10));
        desk.open_rental(request("7", 1, 0, "")).expect("first rental");
        assert!(!desk.is_customer_id_available("7"));

        let err = desk.open_rental(request("7", 1, 0, "")).unwrap_err();
        assert_eq!(err, RentalError::CustomerAlreadyRenting("7".to_string()));
        assert_eq!(desk.inventory().skis, 9);
        assert_eq!(desk.day_report().skis_rented, 1);

        desk.return_rental("7", at(1, 10)).expect("return");
        assert!(desk.is_customer_id_available("7"));
        desk.open_rental(request("7", 1, 0, "")).expect("second rental");
    }

    #[test]
    fn failed_open_leaves_no_trace() {
        let mut desk = RentalDesk::new(Store::new(2, 2));
        let err = desk.open_rental(request("1", 3, 0, "")).unwrap_err();
        assert!(matches!(err, RentalError::InsufficientInventory { .. }));
        assert!(desk.is_customer_id_available("1"));
        assert_eq!(desk.day_report().skis_rented, 0);
        assert_eq!(desk.inventory().skis, 2);
    }

    #[test]
    fn return_restores_inventory_and_books_revenue() {
        let mut desk = RentalDesk::new(Store::new(10, 10));
        let before = desk.inventory();
        desk.open_rental(request("4", 2, 2, "xyzBBP")).expect("open");
        assert_eq!(desk.inventory().skis, 8);

        let invoice = desk.return_rental("4", at(1, 12)).expect("return");
        // 3 hours of 2 skis + 2 boards = 150, family 25% off, code 10% off
        assert_eq!(invoice.settlement.subtotal, 150.0);
        assert_eq!(invoice.final_cost(), 101.25);
        assert_eq!(desk.inventory(), before);
        assert_eq!(desk.active_count(), 0);

        let report = desk.day_report();
        assert_eq!(report.skis_rented, 2);
        assert_eq!(report.snowboards_rented, 2);
        assert_eq!(report.revenue, 101.25);

        let text = invoice.to_string();
        assert!(text.contains("Customer Name: Customer 4"));
        assert!(text.contains("Duration: 0 days, 3 hours, 0 minutes, 0 seconds"));
        assert!(text.contains("Final Total: $101.25"));
    }

    #[test]
    fn unknown_or_premature_returns_keep_registry_intact() {
        let mut desk = RentalDesk::new(Store::new(5, 5));
        assert_eq!(
            desk.return_rental("9", at(1, 10)).unwrap_err(),
            RentalError::UnknownCustomer("9".to_string())
        );

        desk.open_rental(request("9", 1, 1, "")).expect("open");
        let err = desk.return_rental("9", at(1, 8)).unwrap_err();
        assert!(matches!(err, RentalError::ReturnBeforeStart { .. }));
        assert!(desk.active_rental("9").is_some());
        assert_eq!(desk.store().total_transactions(), 0.0);
    }

    #[test]
    fn report_prints_revenue_with_cents() {
        let desk = RentalDesk::new(Store::default());
        let text = desk.day_report().to_string();
        assert!(text.starts_with("END OF DAY REPORT"));
        assert!(text.contains("Total Revenue Collected: $0.00"));
    }

    #[test]
    fn formats_durations_like_a_clock() {
        let elapsed = Duration::days(1) + Duration::hours(2) + Duration::seconds(65);
        assert_eq!(
            format_duration(elapsed),
            "1 days, 2 hours, 1 minutes, 5 seconds"
        );
    }
}
