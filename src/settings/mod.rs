//! User settings for the expense tracker.
//!
//! A single settings row holds the user's display name, contact details,
//! monthly budget and preferred currency. The currency symbol is always
//! derived from the currency code, never stored or accepted from input.

mod core;
mod page;
mod update_endpoint;

pub use core::{
    BudgetUsage, Settings, create_settings_table, currency_symbol, ensure_default_settings,
    get_or_create_settings,
};
pub use page::get_settings_page;
pub use update_endpoint::update_settings_endpoint;
