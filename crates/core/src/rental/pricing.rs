//! Rate table, tier promotion and discount rules.

use std::ops::RangeInclusive;

use chrono::Duration;

use crate::models::RentalType;

/// Periods at or above this length are billed on the next tier up.
pub const PROMOTION_THRESHOLD: u32 = 4;
/// Equipment counts that qualify for the family discount.
pub const FAMILY_SIZE: RangeInclusive<u32> = 3..=5;
/// Multiplier applied by the family discount.
pub const FAMILY_DISCOUNT_FACTOR: f64 = 0.75;
/// Multiplier applied by a valid discount code.
pub const CODE_DISCOUNT_FACTOR: f64 = 0.90;
/// Required suffix of a discount code.
pub const CODE_SUFFIX: &str = "BBP";
/// Required length of a discount code, in characters.
pub const CODE_LENGTH: usize = 6;

const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const DAYS_PER_WEEK: i64 = 7;

/// Price breakdown for a period that has not been rented yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Tier the customer asked for.
    pub requested_type: RentalType,
    /// Period the customer asked for, in units of `requested_type`.
    pub requested_period: u32,
    /// Tier actually billed after promotion.
    pub billed_type: RentalType,
    /// Period actually billed, in units of `billed_type`.
    pub billed_period: u32,
    /// Cost before discounts.
    pub amount: f64,
}

/// Move long periods to the next tier.
///
/// Hourly periods of 4 or more become `(hours - 4) / 24 + 1` days, and
/// daily periods of 4 or more become `(days - 4) / 7 + 1` weeks. The steps
/// chain, so a very long hourly period can end up weekly.
pub fn promote(rental_type: RentalType, period: u32) -> (RentalType, u32) {
    let (mut tier, mut period) = (rental_type, period);
    if tier == RentalType::Hourly && period >= PROMOTION_THRESHOLD {
        tier = RentalType::Daily;
        period = (period - PROMOTION_THRESHOLD) / 24 + 1;
    }
    if tier == RentalType::Daily && period >= PROMOTION_THRESHOLD {
        tier = RentalType::Weekly;
        period = (period - PROMOTION_THRESHOLD) / 7 + 1;
    }
    (tier, period)
}

/// Undiscounted cost of `period` units of `rental_type`.
pub fn price(rental_type: RentalType, period: u32, skis: u32, snowboards: u32) -> f64 {
    let per_period =
        u64::from(rental_type.ski_rate()) * u64::from(skis)
            + u64::from(rental_type.snowboard_rate()) * u64::from(snowboards);
    (u64::from(period) * per_period) as f64
}

/// Quote a requested period, applying tier promotion.
pub fn estimate(rental_type: RentalType, period: u32, skis: u32, snowboards: u32) -> Quote {
    let (billed_type, billed_period) = promote(rental_type, period);
    Quote {
        requested_type: rental_type,
        requested_period: period,
        billed_type,
        billed_period,
        amount: price(billed_type, billed_period, skis, snowboards),
    }
}

/// Express an elapsed duration in whole units of `rental_type`.
///
/// A started hour counts as a full hour, and a week is billed in full once
/// any of its days is complete. Days only count once complete. Negative
/// durations count as zero.
pub fn elapsed_units(rental_type: RentalType, elapsed: Duration) -> u32 {
    let seconds = elapsed.num_seconds().max(0);
    let units = match rental_type {
        RentalType::Hourly => (seconds + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR,
        RentalType::Daily => seconds / SECONDS_PER_DAY,
        RentalType::Weekly => (seconds / SECONDS_PER_DAY + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK,
    };
    u32::try_from(units).unwrap_or(u32::MAX)
}

/// Tier and number of units billed for a rental that lasted `elapsed`.
///
/// The elapsed time goes through the same promotion as an estimate, and
/// at least one unit is always billed.
pub fn billed_for_elapsed(rental_type: RentalType, elapsed: Duration) -> (RentalType, u32) {
    let (tier, units) = promote(rental_type, elapsed_units(rental_type, elapsed));
    (tier, units.max(1))
}

/// Whether a party renting `equipment_count` pieces gets the family discount.
pub fn family_discount_applies(equipment_count: u32) -> bool {
    FAMILY_SIZE.contains(&equipment_count)
}

/// Whether `code` is a valid discount code.
pub fn discount_code_applies(code: &str) -> bool {
    code.chars().count() == CODE_LENGTH && code.ends_with(CODE_SUFFIX)
}

/// Round a dollar amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
