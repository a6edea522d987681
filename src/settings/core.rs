//! The settings model and database queries.

use rusqlite::{Connection, Row, params, types::Type};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::Error;

/// The default currency code for new settings rows.
pub const DEFAULT_CURRENCY: &str = "BDT";

/// The default display name for new settings rows.
const DEFAULT_USER_NAME: &str = "User";

/// Map a currency code to its display symbol.
///
/// Unrecognised codes fall back to the Taka symbol, matching the default
/// currency.
pub fn currency_symbol(code: &str) -> &'static str {
    match code {
        "BDT" => "৳",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "INR" => "₹",
        _ => "৳",
    }
}

/// The user's preferences, stored as a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// The user's display name.
    pub user_name: String,
    /// The user's email address, if provided.
    pub email: Option<String>,
    /// A reference to the user's profile picture, if provided.
    pub profile_picture: Option<String>,
    /// The monthly spending budget. Zero means no budget is set.
    pub monthly_budget: Decimal,
    /// The preferred currency code, e.g. "BDT" or "USD".
    pub currency: String,
    /// When the settings were last changed.
    pub updated_at: OffsetDateTime,
}

impl Settings {
    /// The display symbol for the preferred currency.
    ///
    /// Derived from the currency code; settings never store a symbol.
    pub fn symbol(&self) -> &'static str {
        currency_symbol(&self.currency)
    }
}

/// The fields of [Settings] that may be changed by the user.
///
/// The currency symbol and profile picture are deliberately absent: the
/// symbol is derived from the code, and the picture is managed elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    /// The user's display name.
    pub user_name: String,
    /// The user's email address.
    pub email: Option<String>,
    /// The monthly spending budget.
    pub monthly_budget: Decimal,
    /// The preferred currency code.
    pub currency: String,
}

/// A monthly budget and the spending counted against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUsage {
    /// The monthly budget from the user's settings.
    pub budget: Decimal,
    /// The expenses recorded for the month.
    pub spent: Decimal,
}

impl BudgetUsage {
    /// How much of the budget is left. Negative when overspent.
    pub fn remaining(&self) -> Decimal {
        self.budget - self.spent
    }

    /// How much of the budget is used, as a percentage.
    ///
    /// Defined as 0 when no budget is set (division guard).
    pub fn percent_used(&self) -> Decimal {
        if self.budget <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        self.spent / self.budget * Decimal::ONE_HUNDRED
    }
}

/// Create the settings table in the database.
///
/// The `CHECK (id = 1)` constraint makes the table single-row by
/// construction, so concurrent get-or-create calls cannot produce duplicates.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                user_name TEXT NOT NULL,
                email TEXT,
                profile_picture TEXT,
                monthly_budget TEXT NOT NULL,
                currency TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert the default settings row if none exists yet.
///
/// Safe to call any number of times; the single-row constraint plus
/// `INSERT OR IGNORE` make it an idempotent upsert.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn ensure_default_settings(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "INSERT OR IGNORE INTO settings (id, user_name, email, profile_picture, monthly_budget, currency, updated_at)
         VALUES (1, ?1, NULL, NULL, '0', ?2, ?3)",
        params![DEFAULT_USER_NAME, DEFAULT_CURRENCY, OffsetDateTime::now_utc()],
    )?;

    Ok(())
}

/// Read the settings row, creating it with defaults first if absent.
///
/// First access therefore implies a write, but the operation is idempotent:
/// repeated calls return the same single persisted row.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_or_create_settings(connection: &Connection) -> Result<Settings, Error> {
    ensure_default_settings(connection)?;

    let settings = connection
        .prepare(
            "SELECT user_name, email, profile_picture, monthly_budget, currency, updated_at
             FROM settings WHERE id = 1",
        )?
        .query_one([], map_settings_row)?;

    Ok(settings)
}

/// Apply `update` to the settings row and refresh its `updated_at` timestamp.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn update_settings(update: SettingsUpdate, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE settings
         SET user_name = ?1, email = ?2, monthly_budget = ?3, currency = ?4, updated_at = ?5
         WHERE id = 1",
        params![
            update.user_name,
            update.email,
            update.monthly_budget.to_string(),
            update.currency,
            OffsetDateTime::now_utc(),
        ],
    )?;

    Ok(())
}

fn map_settings_row(row: &Row) -> Result<Settings, rusqlite::Error> {
    let user_name = row.get(0)?;
    let email = row.get(1)?;
    let profile_picture = row.get(2)?;

    let raw_budget: String = row.get(3)?;
    let monthly_budget = raw_budget
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    let currency = row.get(4)?;
    let updated_at = row.get(5)?;

    Ok(Settings {
        user_name,
        email,
        profile_picture,
        monthly_budget,
        currency,
        updated_at,
    })
}


#[cfg(test)]
mod currency_symbol_tests {
    use super::currency_symbol;

    #[test]
    fn known_codes_map_to_symbols() {
        assert_eq!(currency_symbol("BDT"), "৳");
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("GBP"), "£");
        assert_eq!(currency_symbol("INR"), "₹");
    }

    #[test]
    fn unknown_codes_fall_back_to_taka() {
        assert_eq!(currency_symbol("XYZ"), "৳");
        assert_eq!(currency_symbol(""), "৳");
    }
}

#[cfg(test)]
mod budget_usage_tests {
    use rust_decimal::Decimal;

    use super::BudgetUsage;

    #[test]
    fn percent_used_computes_share_of_budget() {
        let usage = BudgetUsage {
            budget: Decimal::from(1000),
            spent: Decimal::from(250),
        };

        assert_eq!(usage.percent_used(), Decimal::from(25));
        assert_eq!(usage.remaining(), Decimal::from(750));
    }

    #[test]
    fn percent_used_guards_zero_budget() {
        let usage = BudgetUsage {
            budget: Decimal::ZERO,
            spent: Decimal::from(100),
        };

        assert_eq!(usage.percent_used(), Decimal::ZERO);
    }
}
