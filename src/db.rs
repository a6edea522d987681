//! Database initialization for the application's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    settings::{create_settings_table, ensure_default_settings},
    transaction::create_transaction_table,
};

/// Create the application's tables and seed the default settings row.
///
/// Seeding the singleton settings row here makes first access a plain read
/// everywhere else, so two concurrent requests can never race to create it.
///
/// # Errors
/// Returns an error if any of the tables cannot be created or if there is an
/// SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_settings_table(&transaction)?;
    ensure_default_settings(&transaction)?;

    transaction.commit()?;

    Ok(())
}
