#![warn(clippy::all, missing_docs)]

//! Core domain logic for the rental shop.
//!
//! This crate hosts the inventory and pricing models, the rental desk
//! that tracks open rentals, the generic menu navigator, and the
//! configuration layer used by the terminal UI.

pub mod clock;
pub mod config;
pub mod desk;
pub mod error;
pub mod menu;
pub mod models;
pub mod rental;
pub mod store;

pub use config::AppConfig;
pub use desk::{NewRental, RentalDesk};
pub use error::RentalError;
pub use menu::{Menu, MenuOutcome, MenuSystem, NavigationKeys};
pub use models::{Customer, RentalType};
pub use rental::Rental;
pub use store::Store;
