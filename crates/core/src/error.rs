//! Error types raised by the rental domain.

use thiserror::Error;

/// Failures surfaced by rental operations.
///
/// None of these are fatal; the front-end reports them and keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentalError {
    /// A rental was requested without any equipment.
    #[error("at least one ski or snowboard must be rented")]
    EmptyRequest,
    /// The store cannot cover the requested quantities.
    #[error(
        "inventory is not sufficient: requested {requested_skis} skis / {requested_snowboards} snowboards, \
         available {available_skis} / {available_snowboards}"
    )]
    InsufficientInventory {
        /// Skis asked for.
        requested_skis: u32,
        /// Snowboards asked for.
        requested_snowboards: u32,
        /// Skis currently on the shelf.
        available_skis: u32,
        /// Snowboards currently on the shelf.
        available_snowboards: u32,
    },
    /// The customer id already holds an open rental.
    #[error("customer {0} already has an open rental")]
    CustomerAlreadyRenting(String),
    /// No open rental is registered for the customer id.
    #[error("such ID does not exist: {0}")]
    UnknownCustomer(String),
    /// The return time lies before the rental start.
    #[error("return time {returned_at} is before rental start {started_at}")]
    ReturnBeforeStart {
        /// When the rental began.
        started_at: chrono::NaiveDateTime,
        /// The rejected return time.
        returned_at: chrono::NaiveDateTime,
    },
    /// The rental has already been returned.
    #[error("rental has already been returned")]
    AlreadyReturned,
    /// A rental was closed before its cost was calculated.
    #[error("rental cost has not been calculated")]
    CostNotCalculated,
    /// A rental type code outside 1..=3.
    #[error("unknown rental type {0:?} (expected 1=Hourly, 2=Daily, 3=Weekly)")]
    InvalidRentalType(String),
    /// A manually entered timestamp could not be parsed.
    #[error("invalid timestamp {0:?}, use M:D:Y:HH:MM")]
    InvalidTimestamp(String),
}
