//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{Connection, Row, params, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, database_id::TransactionId, window::MonthWindow};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in or takes money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. salary, freelance work.
    Income,
    /// Money spent, e.g. groceries, rent.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database and shown in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The category of a transaction, e.g. "Salary", "Food", "Transport".
///
/// Categories are free-form labels chosen by the user; the set of categories
/// is whatever appears in the data, not a predefined list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is an
    /// empty string or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded money movement, either income or an expense.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: CategoryName,
    /// The amount of money that moved.
    ///
    /// Amounts use fixed-point decimal arithmetic since they represent money.
    /// They are treated as non-negative, though the store does not enforce it.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// The economic date of the transaction, supplied by the user.
    pub date: Date,
    /// When the transaction was recorded, assigned at insertion.
    pub created_at: OffsetDateTime,
    /// Marks a recurring/fixed expense, e.g. rent or a subscription.
    pub is_fixed: bool,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionKind,
        category: CategoryName,
        amount: Decimal,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            category,
            amount,
            date,
            description: None,
            is_fixed: false,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to sensible values; pass the builder to
/// [create_transaction] to persist it, which assigns the ID and the
/// `created_at` timestamp.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: CategoryName,
    /// The amount of money that moved.
    pub amount: Decimal,
    /// The economic date of the transaction.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// Marks a recurring/fixed expense.
    pub is_fixed: bool,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Mark the transaction as a fixed (recurring) expense.
    pub fn is_fixed(mut self, is_fixed: bool) -> Self {
        self.is_fixed = is_fixed;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// The `created_at` timestamp is assigned here, at insertion.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let created_at = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (kind, category, amount, description, date, created_at, is_fixed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, kind, category, amount, description, date, created_at, is_fixed",
        )?
        .query_row(
            params![
                builder.kind.as_str(),
                builder.category.as_ref(),
                builder.amount.to_string(),
                builder.description,
                builder.date,
                created_at,
                builder.is_fixed,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transactions whose date falls in the given calendar month,
/// most recent first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_in_month(
    window: MonthWindow,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, category, amount, description, date, created_at, is_fixed
             FROM \"transaction\"
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            params![window.first_day(), window.last_day()],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every transaction in the database, most recent first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, category, amount, description, date, created_at, is_fixed
             FROM \"transaction\"
             ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// The number of rows removed by a delete.
pub type RowsAffected = usize;

/// Delete a transaction from the database.
///
/// Deleting an ID that does not exist is not an error: the delete is
/// idempotent and reports zero rows affected.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// Amounts are stored as TEXT and parsed back into [Decimal] so that money
/// keeps exact fixed-point semantics end to end.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                is_fixed INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Add composite index used by the monthly views.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_kind ON \"transaction\"(date, kind);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;

    let raw_kind: String = row.get(1)?;
    let kind = match raw_kind.as_str() {
        "Income" => TransactionKind::Income,
        "Expense" => TransactionKind::Expense,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("unknown transaction kind {other:?}").into(),
            ));
        }
    };

    let raw_category: String = row.get(2)?;
    let category = CategoryName::new_unchecked(&raw_category);

    let raw_amount: String = row.get(3)?;
    let amount = raw_amount
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    let description = row.get(4)?;
    let date = row.get(5)?;
    let created_at = row.get(6)?;
    let is_fixed = row.get(7)?;

    Ok(Transaction {
        id,
        kind,
        category,
        amount,
        description,
        date,
        created_at,
        is_fixed,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{
            CategoryName, Transaction, TransactionKind, count_transactions, create_transaction,
            get_all_transactions, get_transactions_in_month,
        },
        window::MonthWindow,
    };

    use super::{TransactionId, delete_transaction, map_transaction_row};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn get_transaction(id: TransactionId, connection: &Connection) -> Transaction {
        connection
            .query_one(
                "SELECT id, kind, category, amount, description, date, created_at, is_fixed
                 FROM \"transaction\" WHERE id = ?1",
                rusqlite::params![id],
                map_transaction_row,
            )
            .expect("Could not get transaction")
    }

    fn decimal(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = decimal("12.30");

        let result = create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                CategoryName::new_unchecked("Food"),
                amount,
                date!(2025 - 10 - 05),
            ),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert!(transaction.id > 0);
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.kind, TransactionKind::Expense);
                assert_eq!(transaction.category.as_ref(), "Food");
                assert!(!transaction.is_fixed);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn amounts_round_trip_exactly() {
        let conn = get_test_connection();
        // A value that cannot be represented exactly as a binary float.
        let amount = decimal("0.10");

        let created = create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                CategoryName::new_unchecked("Snacks"),
                amount,
                date!(2025 - 06 - 01),
            ),
            &conn,
        )
        .unwrap();

        let fetched = get_transaction(created.id, &conn);

        assert_eq!(fetched.amount, amount);
        assert_eq!(fetched.amount.to_string(), "0.10");
    }

    #[test]
    fn builder_sets_description_and_fixed_flag() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                CategoryName::new_unchecked("Rent"),
                decimal("1200"),
                date!(2025 - 06 - 01),
            )
            .description(Some("June rent".to_owned()))
            .is_fixed(true),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.description.as_deref(), Some("June rent"));
        assert!(transaction.is_fixed);
    }

    #[test]
    fn get_transactions_in_month_filters_and_orders() {
        let conn = get_test_connection();
        let june = MonthWindow {
            year: 2025,
            month: time::Month::June,
        };

        for (amount, date) in [
            ("10", date!(2025 - 06 - 01)),
            ("20", date!(2025 - 06 - 15)),
            ("30", date!(2025 - 05 - 31)),
            ("40", date!(2025 - 07 - 01)),
        ] {
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new_unchecked("Food"),
                    decimal(amount),
                    date,
                ),
                &conn,
            )
            .unwrap();
        }

        let transactions = get_transactions_in_month(june, &conn).unwrap();

        assert_eq!(transactions.len(), 2);
        // Most recent first.
        assert_eq!(transactions[0].date, date!(2025 - 06 - 15));
        assert_eq!(transactions[1].date, date!(2025 - 06 - 01));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(
                TransactionKind::Income,
                CategoryName::new_unchecked("Salary"),
                decimal("1000"),
                date!(2025 - 06 - 01),
            ),
            &conn,
        )
        .unwrap();

        let rows_affected = delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn delete_missing_transaction_is_a_no_op() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(
                TransactionKind::Income,
                CategoryName::new_unchecked("Salary"),
                decimal("1000"),
                date!(2025 - 06 - 01),
            ),
            &conn,
        )
        .unwrap();

        let rows_affected = delete_transaction(999, &conn).unwrap();

        assert_eq!(rows_affected, 0);
        assert_eq!(count_transactions(&conn), Ok(1));
    }

    #[test]
    fn get_all_transactions_returns_every_row() {
        let conn = get_test_connection();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new_unchecked("Misc"),
                    Decimal::from(i),
                    date!(2025 - 10 - 05),
                ),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let transactions = get_all_transactions(&conn).expect("Could not get transactions");

        assert_eq!(transactions.len(), want_count);
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, transaction::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category = CategoryName::new("");

        assert_eq!(category, Err(Error::EmptyCategory));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category = CategoryName::new("\n\t \r");

        assert_eq!(category, Err(Error::EmptyCategory));
    }

    #[test]
    fn new_trims_whitespace() {
        let category = CategoryName::new("  Food  ").unwrap();

        assert_eq!(category.as_ref(), "Food");
    }
}
