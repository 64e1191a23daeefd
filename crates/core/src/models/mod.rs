//! Shared domain models.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::RentalError, store::Store};

/// Billing tier for a rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentalType {
    /// Billed per hour.
    Hourly,
    /// Billed per day.
    Daily,
    /// Billed per week.
    Weekly,
}

impl RentalType {
    /// Price of one ski for one period of this tier, in dollars.
    pub fn ski_rate(self) -> u32 {
        match self {
            RentalType::Hourly => 15,
            RentalType::Daily => 50,
            RentalType::Weekly => 200,
        }
    }

    /// Price of one snowboard for one period of this tier, in dollars.
    pub fn snowboard_rate(self) -> u32 {
        match self {
            RentalType::Hourly => 10,
            RentalType::Daily => 40,
            RentalType::Weekly => 160,
        }
    }

    /// Plural unit label used when printing periods.
    pub fn unit_label(self) -> &'static str {
        match self {
            RentalType::Hourly => "Hours",
            RentalType::Daily => "Days",
            RentalType::Weekly => "Weeks",
        }
    }

    /// Human readable period such as `5 Hours`.
    pub fn describe_period(self, period: u32) -> String {
        format!("{period} {}", self.unit_label())
    }
}

impl fmt::Display for RentalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RentalType::Hourly => "Hourly",
            RentalType::Daily => "Daily",
            RentalType::Weekly => "Weekly",
        };
        f.write_str(label)
    }
}

impl FromStr for RentalType {
    type Err = RentalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "hourly" | "h" => Ok(RentalType::Hourly),
            "2" | "daily" | "d" => Ok(RentalType::Daily),
            "3" | "weekly" | "w" => Ok(RentalType::Weekly),
            _ => Err(RentalError::InvalidRentalType(input.trim().to_string())),
        }
    }
}

/// A shop customer and the equipment they are currently asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Display name.
    pub name: String,
    /// Identifier used as the registry key.
    pub id: String,
    /// Skis currently requested.
    pub skis: u32,
    /// Snowboards currently requested.
    pub snowboards: u32,
}

impl Customer {
    /// Create a customer with no pending request.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            skis: 0,
            snowboards: 0,
        }
    }

    /// Placeholder customer used for quotes that never touch inventory.
    pub fn placeholder() -> Self {
        Self::new("Estimate", "")
    }

    /// Record a request, rejecting it when the store cannot cover it.
    pub fn request_equipment(
        &mut self,
        skis: u32,
        snowboards: u32,
        store: &Store,
    ) -> Result<(), RentalError> {
        if !store.can_supply(skis, snowboards) {
            return Err(store.shortage(skis, snowboards));
        }
        self.skis = skis;
        self.snowboards = snowboards;
        Ok(())
    }

    /// Total pieces of equipment requested.
    pub fn equipment_count(&self) -> u32 {
        self.skis.saturating_add(self.snowboards)
    }
}
