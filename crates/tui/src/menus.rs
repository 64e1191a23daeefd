//! Shop screens plugged into the generic menu system.

use std::fmt::Display;

use chrono::NaiveDateTime;
use rentshop_core::{
    clock::{self, Clock, TIMESTAMP_HINT},
    Menu, MenuOutcome, NewRental, RentalDesk, RentalType,
};
use tracing::info;

const MAX_FIELD_LEN: usize = 48;

/// State shared by every shop menu.
pub struct ShopContext {
    pub desk: RentalDesk,
    pub clock: Clock,
    /// Last document printed (estimate, receipt, invoice, report).
    pub output: Vec<String>,
    pub status: String,
}

impl ShopContext {
    pub fn new(desk: RentalDesk, clock: Clock) -> Self {
        Self {
            desk,
            clock,
            output: Vec::new(),
            status: "Ready".to_string(),
        }
    }

    fn print(&mut self, document: impl Display) {
        self.output = document.to_string().lines().map(str::to_string).collect();
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShopMenu {
    Main,
    NewRental(RentalForm),
    Return(ReturnForm),
    Inventory,
    EndOfDay,
}

impl Menu for ShopMenu {
    type Context = ShopContext;

    fn title(&self) -> &str {
        match self {
            ShopMenu::Main => "Main Menu",
            ShopMenu::NewRental(_) => "New Customer Rental",
            ShopMenu::Return(_) => "Rental Return",
            ShopMenu::Inventory => "Inventory",
            ShopMenu::EndOfDay => "End of Day",
        }
    }

    fn lines(&self, ctx: &ShopContext) -> Vec<String> {
        match self {
            ShopMenu::Main => vec![
                "=== Ski & Snowboard Rental System ===".to_string(),
                "1. New Customer Rental".to_string(),
                "2. Rental Return".to_string(),
                "3. Show Inventory".to_string(),
                "4. End of Day".to_string(),
                String::new(),
                "Enter your choice:".to_string(),
            ],
            ShopMenu::NewRental(form) => form.lines(ctx.clock),
            ShopMenu::Return(form) => form.lines(ctx),
            ShopMenu::Inventory => {
                let inventory = ctx.desk.inventory();
                vec![
                    "------ Inventory ------".to_string(),
                    format!("Skis: {} of {}", inventory.skis, inventory.ski_total),
                    format!(
                        "Snowboards: {} of {}",
                        inventory.snowboards, inventory.snowboard_total
                    ),
                    format!("Open rentals: {}", ctx.desk.active_count()),
                    String::new(),
                    "Press Enter to continue...".to_string(),
                ]
            }
            ShopMenu::EndOfDay => {
                let mut lines: Vec<String> = ctx
                    .desk
                    .day_report()
                    .to_string()
                    .lines()
                    .map(str::to_string)
                    .collect();
                lines.push(String::new());
                lines.push("Press Enter to close the shop.".to_string());
                lines
            }
        }
    }

    fn show_headers(&self) -> bool {
        !matches!(self, ShopMenu::Main)
    }

    fn handle_input(&mut self, input: &str, ctx: &mut ShopContext) -> MenuOutcome<Self> {
        match self {
            ShopMenu::Main => match input.trim() {
                "1" => MenuOutcome::Open(ShopMenu::NewRental(RentalForm::default())),
                "2" => MenuOutcome::Open(ShopMenu::Return(ReturnForm::default())),
                "3" => MenuOutcome::Open(ShopMenu::Inventory),
                "4" => MenuOutcome::Open(ShopMenu::EndOfDay),
                _ => {
                    ctx.set_status("Invalid choice. Please try again.");
                    MenuOutcome::Stay
                }
            },
            ShopMenu::NewRental(form) => form.handle(input, ctx),
            ShopMenu::Return(form) => form.handle(input, ctx),
            ShopMenu::Inventory => MenuOutcome::MainMenu,
            ShopMenu::EndOfDay => {
                let report = ctx.desk.day_report();
                info!(
                    skis = report.skis_rented,
                    snowboards = report.snowboards_rented,
                    revenue = report.revenue,
                    open_rentals = report.open_rentals,
                    "shop closed"
                );
                ctx.print(report);
                MenuOutcome::Exit
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
enum RentalStep {
    #[default]
    Name,
    CustomerId,
    Skis,
    Snowboards,
    RentalType,
    Period,
    DiscountCode,
    ShowEstimate,
    Confirm,
    StartTime,
}

/// Questions asked before handing out equipment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RentalForm {
    step: RentalStep,
    name: String,
    customer_id: String,
    skis: u32,
    snowboards: u32,
    rental_type: Option<RentalType>,
    period: u32,
    discount_code: String,
}

impl RentalForm {
    fn lines(&self, clock: Clock) -> Vec<String> {
        let mut lines = vec!["--- New Customer Rental ---".to_string()];
        if self.step > RentalStep::Name {
            lines.push(format!("Customer: {}", self.name));
        }
        if self.step > RentalStep::CustomerId {
            lines.push(format!("Customer ID: {}", self.customer_id));
        }
        if self.step > RentalStep::Skis {
            lines.push(format!("Skis: {}", self.skis));
        }
        if self.step > RentalStep::Snowboards {
            lines.push(format!("Snowboards: {}", self.snowboards));
        }
        if let (true, Some(rental_type)) = (self.step > RentalStep::RentalType, self.rental_type) {
            lines.push(format!("Rental Type: {rental_type}"));
        }
        if let (true, Some(rental_type)) = (self.step > RentalStep::Period, self.rental_type) {
            lines.push(format!("Period: {}", rental_type.describe_period(self.period)));
        }
        if self.step > RentalStep::DiscountCode {
            lines.push(format!("Discount Code: {}", self.discount_code));
        }
        lines.push(String::new());
        lines.push(self.prompt(clock));
        lines
    }

    fn prompt(&self, clock: Clock) -> String {
        match self.step {
            RentalStep::Name => "Enter customer name:".to_string(),
            RentalStep::CustomerId => "Enter customer ID:".to_string(),
            RentalStep::Skis => "Enter skis to rent:".to_string(),
            RentalStep::Snowboards => "Enter snowboards to rent:".to_string(),
            RentalStep::RentalType => {
                "Enter rental type (1=Hourly, 2=Daily, 3=Weekly):".to_string()
            }
            RentalStep::Period => "Enter rental duration (hours/days/weeks):".to_string(),
            RentalStep::DiscountCode => "Enter discount code (or press Enter):".to_string(),
            RentalStep::ShowEstimate => "Show estimate? (y/n)".to_string(),
            RentalStep::Confirm if clock.is_manual() => {
                "Complete rental? (y/n) - start time is asked next".to_string()
            }
            RentalStep::Confirm => "Complete rental? (y/n)".to_string(),
            RentalStep::StartTime => format!("Enter rental start ({TIMESTAMP_HINT}):"),
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn handle(&mut self, input: &str, ctx: &mut ShopContext) -> MenuOutcome<ShopMenu> {
        let input = input.trim();
        match self.step {
            RentalStep::Name => match parse_text(input) {
                Ok(name) => {
                    self.name = name;
                    self.step = RentalStep::CustomerId;
                }
                Err(message) => ctx.set_status(message),
            },
            RentalStep::CustomerId => match parse_number(input, false) {
                Ok(id) if !ctx.desk.is_customer_id_available(&id.to_string()) => {
                    ctx.set_status(format!("Customer {id} already has an open rental."));
                }
                Ok(id) => {
                    self.customer_id = id.to_string();
                    self.step = RentalStep::Skis;
                }
                Err(message) => ctx.set_status(message),
            },
            RentalStep::Skis => match parse_number(input, true) {
                Ok(skis) => {
                    self.skis = skis;
                    self.step = RentalStep::Snowboards;
                }
                Err(message) => ctx.set_status(message),
            },
            RentalStep::Snowboards => match parse_number(input, true) {
                Ok(0) if self.skis == 0 => {
                    ctx.set_status("Rent at least one ski or snowboard.");
                    self.step = RentalStep::Skis;
                }
                Ok(snowboards) if !ctx.desk.is_inventory_sufficient(self.skis, snowboards) => {
                    let inventory = ctx.desk.inventory();
                    ctx.set_status(format!(
                        "Inventory is not sufficient ({} skis, {} snowboards available).",
                        inventory.skis, inventory.snowboards
                    ));
                    self.reset();
                    return MenuOutcome::MainMenu;
                }
                Ok(snowboards) => {
                    self.snowboards = snowboards;
                    self.step = RentalStep::RentalType;
                }
                Err(message) => ctx.set_status(message),
            },
            RentalStep::RentalType => match input.parse::<RentalType>() {
                Ok(rental_type) => {
                    self.rental_type = Some(rental_type);
                    self.step = RentalStep::Period;
                }
                Err(err) => ctx.set_status(err.to_string()),
            },
            RentalStep::Period => match parse_number(input, true) {
                Ok(period) => {
                    self.period = period;
                    self.step = RentalStep::DiscountCode;
                }
                Err(message) => ctx.set_status(message),
            },
            RentalStep::DiscountCode => {
                self.discount_code = input.chars().take(MAX_FIELD_LEN).collect();
                self.step = RentalStep::ShowEstimate;
            }
            RentalStep::ShowEstimate => match parse_yes_no(input) {
                Some(show) => {
                    if show {
                        let estimate = ctx.desk.estimate(
                            self.skis,
                            self.snowboards,
                            self.rental_type.unwrap_or(RentalType::Hourly),
                            self.period,
                            &self.discount_code,
                        );
                        ctx.print(estimate);
                    }
                    self.step = RentalStep::Confirm;
                }
                None => ctx.set_status("Invalid input, please enter 'y' or 'n'."),
            },
            RentalStep::Confirm => match parse_yes_no(input) {
                Some(true) if ctx.clock.is_manual() => self.step = RentalStep::StartTime,
                Some(true) => return self.complete(clock::now(), ctx),
                Some(false) => {
                    ctx.set_status("Rental cancelled.");
                    self.reset();
                    return MenuOutcome::MainMenu;
                }
                None => ctx.set_status("Invalid input, please enter 'y' or 'n'."),
            },
            RentalStep::StartTime => match clock::parse_timestamp(input) {
                Ok(started_at) => return self.complete(started_at, ctx),
                Err(err) => ctx.set_status(err.to_string()),
            },
        }
        MenuOutcome::Stay
    }

    fn complete(
        &mut self,
        started_at: NaiveDateTime,
        ctx: &mut ShopContext,
    ) -> MenuOutcome<ShopMenu> {
        let request = NewRental {
            customer_id: self.customer_id.clone(),
            customer_name: self.name.clone(),
            skis: self.skis,
            snowboards: self.snowboards,
            rental_type: self.rental_type.unwrap_or(RentalType::Hourly),
            started_at,
            discount_code: self.discount_code.clone(),
        };
        match ctx.desk.open_rental(request) {
            Ok(summary) => {
                ctx.set_status(format!("Rental recorded for {}.", summary.customer_name));
                ctx.print(summary);
            }
            Err(err) => ctx.set_status(format!("Rental failed: {err}")),
        }
        self.reset();
        MenuOutcome::MainMenu
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ReturnStep {
    #[default]
    CustomerId,
    ReturnTime,
}

/// Questions asked when equipment comes back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnForm {
    step: ReturnStep,
    customer_id: String,
}

impl ReturnForm {
    fn lines(&self, ctx: &ShopContext) -> Vec<String> {
        let mut lines = vec!["--- Rental Return ---".to_string()];
        match self.step {
            ReturnStep::CustomerId => {
                lines.push(String::new());
                lines.push("Enter customer ID:".to_string());
                lines.push("(leave empty to cancel)".to_string());
            }
            ReturnStep::ReturnTime => {
                lines.push(format!("Customer ID: {}", self.customer_id));
                if let Some(active) = ctx.desk.active_rental(&self.customer_id) {
                    lines.push(format!("Customer: {}", active.customer().name));
                    lines.push(format!(
                        "Rented: {} ski(s), {} snowboard(s), {}",
                        active.skis(),
                        active.snowboards(),
                        active.rental_type()
                    ));
                    lines.push(format!(
                        "Since: {}",
                        clock::format_timestamp(active.rental().started_at())
                    ));
                    if !active.discount_code().is_empty() {
                        lines.push(format!("Discount code: {}", active.discount_code()));
                    }
                }
                lines.push(String::new());
                lines.push(format!("Enter return time ({TIMESTAMP_HINT}):"));
            }
        }
        lines
    }

    fn handle(&mut self, input: &str, ctx: &mut ShopContext) -> MenuOutcome<ShopMenu> {
        let input = input.trim();
        match self.step {
            ReturnStep::CustomerId if input.is_empty() => {
                ctx.set_status("Return cancelled.");
                return MenuOutcome::Back;
            }
            ReturnStep::CustomerId => match parse_number(input, false) {
                Ok(id) => {
                    self.customer_id = id.to_string();
                    if ctx.clock.is_manual() {
                        self.step = ReturnStep::ReturnTime;
                    } else {
                        return self.complete(clock::now(), ctx);
                    }
                }
                Err(message) => ctx.set_status(message),
            },
            ReturnStep::ReturnTime => match clock::parse_timestamp(input) {
                Ok(returned_at) => return self.complete(returned_at, ctx),
                Err(err) => ctx.set_status(err.to_string()),
            },
        }
        MenuOutcome::Stay
    }

    fn complete(
        &mut self,
        returned_at: NaiveDateTime,
        ctx: &mut ShopContext,
    ) -> MenuOutcome<ShopMenu> {
        let outcome = match ctx.desk.return_rental(&self.customer_id, returned_at) {
            Ok(invoice) => {
                ctx.set_status(format!(
                    "Return processed: ${:.2} collected.",
                    invoice.final_cost()
                ));
                ctx.print(invoice);
                MenuOutcome::MainMenu
            }
            Err(err) => {
                ctx.set_status(format!("Return failed: {err}"));
                MenuOutcome::Stay
            }
        };
        *self = Self::default();
        outcome
    }
}

fn parse_text(input: &str) -> Result<String, &'static str> {
    let value = input.trim();
    if value.is_empty() {
        return Err("Please enter a value.");
    }
    Ok(value.chars().take(MAX_FIELD_LEN).collect())
}

fn parse_number(input: &str, allow_zero: bool) -> Result<u32, &'static str> {
    let value = input
        .trim()
        .parse::<i64>()
        .map_err(|_| "That's not a valid number. Please try again.")?;
    if value < 0 || (!allow_zero && value == 0) {
        return Err("Please enter a positive number.");
    }
    u32::try_from(value).map_err(|_| "That number is too large.")
}

fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
