//! Transaction aggregation for dashboards and reports.
//!
//! Provides pure functions that compute totals, category breakdowns,
//! month-over-month changes and trailing monthly series from an
//! already-fetched set of transactions. All money arithmetic is done with
//! fixed-point decimals so sums reconcile exactly.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    transaction::{Transaction, TransactionKind},
    window::MonthWindow,
};

/// The income/expense totals over a set of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: Decimal,
    /// The sum of all expense amounts.
    pub expense: Decimal,
}

impl Totals {
    /// Income minus expenses.
    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }
}

/// The amount and transaction count for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The sum of amounts in this category.
    pub amount: Decimal,
    /// How many transactions contributed to the sum.
    pub count: usize,
}

/// The income and expense sums for one month of a trailing series.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    /// The month this summary covers.
    pub window: MonthWindow,
    /// An abbreviated label such as "Jun 2025".
    pub label: String,
    /// The sum of income amounts in the month.
    pub income: Decimal,
    /// The sum of expense amounts in the month.
    pub expense: Decimal,
}

/// An advisory classification of how spending changed month over month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingAlert {
    /// Spending rose by more than 20%.
    Surge,
    /// Spending rose, but by 20% or less.
    Creeping,
    /// Spending fell compared to the previous month.
    Improved,
}

impl SpendingAlert {
    /// The advisory message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            SpendingAlert::Surge => {
                "Your spending rose sharply compared to last month. \
                Review your recent expenses and consider cutting back."
            }
            SpendingAlert::Creeping => {
                "Your spending is a little higher than last month. \
                Keep an eye on it."
            }
            SpendingAlert::Improved => {
                "Nice work! You spent less than you did last month."
            }
        }
    }
}

/// The transactions whose date falls in the given calendar month.
///
/// A pure filter: the input is not mutated and relative order is preserved.
pub fn filter_by_month(transactions: &[Transaction], window: MonthWindow) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| window.contains(transaction.date))
        .cloned()
        .collect()
}

/// Sum income and expense amounts over `transactions`.
///
/// An empty input yields zero totals, not an error.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => income += transaction.amount,
            TransactionKind::Expense => expense += transaction.amount,
        }
    }

    Totals { income, expense }
}

/// Group the transactions of the given kind by category.
///
/// The result is ordered by amount descending; categories with equal amounts
/// keep the order they were first encountered in. The category set is
/// whatever appears in the data, not a predefined list.
pub fn by_category(transactions: &[Transaction], kind: TransactionKind) -> Vec<CategoryTotal> {
    let mut index_by_category: HashMap<&str, usize> = HashMap::new();
    let mut categories: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
    {
        match index_by_category.get(transaction.category.as_ref()) {
            Some(&index) => {
                let entry = &mut categories[index];
                entry.amount += transaction.amount;
                entry.count += 1;
            }
            None => {
                index_by_category.insert(transaction.category.as_ref(), categories.len());
                categories.push(CategoryTotal {
                    category: transaction.category.as_ref().to_owned(),
                    amount: transaction.amount,
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-encountered order for equal amounts.
    categories.sort_by(|a, b| b.amount.cmp(&a.amount));

    categories
}

/// The percentage change from `previous` to `current`.
///
/// Defined as 0 when `previous` is not positive. That is a policy choice to
/// guard the division, not a numerical identity: callers must not read 0%
/// as "no change" when the previous value was zero.
pub fn month_over_month(current: Decimal, previous: Decimal) -> Decimal {
    if previous <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    (current - previous) / previous * Decimal::ONE_HUNDRED
}

/// Summarise the `n` consecutive months ending at `anchor` (inclusive).
///
/// Always returns exactly `n` entries in ascending chronological order,
/// with zero sums for months that have no transactions. The series is a
/// pure function of the anchor and `n`, so it can be regenerated at will.
pub fn trailing_series(
    transactions: &[Transaction],
    anchor: MonthWindow,
    n: usize,
) -> Vec<MonthSummary> {
    anchor
        .trailing(n)
        .into_iter()
        .map(|window| {
            let monthly = totals(&filter_by_month(transactions, window));

            MonthSummary {
                window,
                label: window.short_label(),
                income: monthly.income,
                expense: monthly.expense,
            }
        })
        .collect()
}

/// The share of income kept after expenses, as a percentage.
///
/// Defined as 0 when income is not positive (division guard).
pub fn savings_rate(total_income: Decimal, total_expense: Decimal) -> Decimal {
    if total_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    (total_income - total_expense) / total_income * Decimal::ONE_HUNDRED
}

/// Classify a month-over-month expense change into an advisory message.
///
/// A change of exactly 0% produces no message.
pub fn spending_alert(expense_change_pct: Decimal) -> Option<SpendingAlert> {
    let twenty = Decimal::from(20);

    if expense_change_pct > twenty {
        Some(SpendingAlert::Surge)
    } else if expense_change_pct > Decimal::ZERO {
        Some(SpendingAlert::Creeping)
    } else if expense_change_pct < Decimal::ZERO {
        Some(SpendingAlert::Improved)
    } else {
        None
    }
}
