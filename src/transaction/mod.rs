//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for recording transactions
//! - Database functions for storing, querying, and deleting transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod delete_endpoint;
mod new_transaction_page;
mod transactions_page;

pub use core::{
    CategoryName, Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, get_all_transactions, get_transactions_in_month,
    map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::count_transactions;
