//! The page listing the transactions for a calendar month.
//!
//! The listing subsumes the income, expense and fixed-expense views: the
//! same month window is filtered by transaction kind and the fixed-expense
//! flag via query parameters.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::aggregation::{CategoryTotal, by_category, totals},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    settings::get_or_create_settings,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind, get_transactions_in_month},
    window::MonthWindow,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters selecting what the transactions page shows.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The calendar month (1-12). Defaults to the current month.
    pub month: Option<u8>,
    /// The 4-digit calendar year. Defaults to the current year.
    pub year: Option<i32>,
    /// Only show transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Only show fixed (recurring) expenses.
    #[serde(default)]
    pub fixed: bool,
}

/// Display the transactions for the selected month.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let window = MonthWindow::from_query(query.month, query.year, local_timezone);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = get_or_create_settings(&connection)
        .inspect_err(|error| tracing::error!("could not get settings: {error}"))?;
    let symbol = settings.symbol();

    let transactions = get_transactions_in_month(window, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let filtered: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| match query.kind {
            Some(kind) => transaction.kind == kind,
            None => true,
        })
        .filter(|transaction| !query.fixed || transaction.is_fixed)
        .collect();

    let summary = query
        .kind
        .map(|kind| (kind, by_category(&filtered, kind)))
        .filter(|(_, categories)| !categories.is_empty());

    Ok(transactions_view(window, &query, &filtered, summary, symbol).into_response())
}

struct FilterLink {
    label: &'static str,
    url: String,
    is_active: bool,
}

fn page_url(window: MonthWindow, kind: Option<TransactionKind>, fixed: bool) -> String {
    let mut url = format!(
        "{}?month={}&year={}",
        endpoints::TRANSACTIONS_VIEW,
        window.month_number(),
        window.year
    );

    match kind {
        Some(TransactionKind::Income) => url.push_str("&kind=income"),
        Some(TransactionKind::Expense) => url.push_str("&kind=expense"),
        None => {}
    }

    if fixed {
        url.push_str("&fixed=true");
    }

    url
}

fn filter_links(window: MonthWindow, query: &TransactionsQuery) -> Vec<FilterLink> {
    vec![
        FilterLink {
            label: "All",
            url: page_url(window, None, false),
            is_active: query.kind.is_none() && !query.fixed,
        },
        FilterLink {
            label: "Income",
            url: page_url(window, Some(TransactionKind::Income), false),
            is_active: query.kind == Some(TransactionKind::Income) && !query.fixed,
        },
        FilterLink {
            label: "Expenses",
            url: page_url(window, Some(TransactionKind::Expense), false),
            is_active: query.kind == Some(TransactionKind::Expense) && !query.fixed,
        },
        FilterLink {
            label: "Fixed expenses",
            url: page_url(window, Some(TransactionKind::Expense), true),
            is_active: query.kind == Some(TransactionKind::Expense) && query.fixed,
        },
    ]
}

fn amount_cell(transaction: &Transaction, symbol: &str) -> Markup {
    let (class, sign) = match transaction.kind {
        TransactionKind::Income => ("text-green-600 dark:text-green-400", "+"),
        TransactionKind::Expense => ("text-red-600 dark:text-red-400", "-"),
    };

    html! {
        span class=(class) { (sign) (format_currency(transaction.amount, symbol)) }
    }
}

fn category_summary_table(
    kind: TransactionKind,
    categories: &[CategoryTotal],
    symbol: &str,
) -> Markup {
    let heading = match kind {
        TransactionKind::Income => "Income by Category",
        TransactionKind::Expense => "Expenses by Category",
    };

    html! {
        div class="w-full mb-8" {
            h3 class="text-xl font-semibold mb-4" { (heading) }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }
                    tbody {
                        @for category in categories {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (category.category) }
                                td class=(TABLE_CELL_STYLE) { (category.count) }
                                td class=(TABLE_CELL_STYLE) {
                                    (format_currency(category.amount, symbol))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transactions_view(
    window: MonthWindow,
    query: &TransactionsQuery,
    transactions: &[Transaction],
    summary: Option<(TransactionKind, Vec<CategoryTotal>)>,
    symbol: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let month_totals = totals(transactions);

    let previous_url = page_url(window.previous(), query.kind, query.fixed);
    let filters = filter_links(window, query);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) {
            div class="w-full max-w-screen-lg" {
                div class="flex flex-wrap items-baseline justify-between mb-4" {
                    h2 class="text-2xl font-bold" { "Transactions for " (window.label()) }

                    (link(endpoints::NEW_TRANSACTION_VIEW, "New transaction"))
                }

                div class="flex flex-wrap items-center gap-4 mb-6" {
                    a href=(previous_url) class=(LINK_STYLE) { "← Previous month" }

                    div class="flex flex-wrap gap-2" {
                        @for filter in &filters {
                            @let style = if filter.is_active {
                                "px-3 py-1 rounded-full text-sm font-semibold \
                                bg-blue-600 text-white"
                            } else {
                                "px-3 py-1 rounded-full text-sm font-semibold \
                                bg-gray-200 text-gray-700 hover:bg-gray-300 \
                                dark:bg-gray-700 dark:text-gray-200"
                            };
                            a href=(filter.url) class=(style) { (filter.label) }
                        }
                    }
                }

                @if transactions.is_empty() {
                    p class="text-gray-600 dark:text-gray-400" {
                        "No transactions for " (window.label()) ". "
                        "You can add one " (link(endpoints::NEW_TRANSACTION_VIEW, "here")) "."
                    }
                } @else {
                    p class="mb-6 text-gray-700 dark:text-gray-300" {
                        "Income: "
                        span class="text-green-600 dark:text-green-400 font-semibold" {
                            (format_currency(month_totals.income, symbol))
                        }
                        " · Expenses: "
                        span class="text-red-600 dark:text-red-400 font-semibold" {
                            (format_currency(month_totals.expense, symbol))
                        }
                        " · Balance: "
                        span class="font-semibold" {
                            (format_currency(month_totals.balance(), symbol))
                        }
                    }

                    @if let Some((kind, categories)) = &summary {
                        (category_summary_table(*kind, categories, symbol))
                    }

                    div class="overflow-x-auto rounded-lg shadow" {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                            thead class=(TABLE_HEADER_STYLE) {
                                tr {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "" }
                                }
                            }
                            tbody {
                                @for transaction in transactions {
                                    tr class=(TABLE_ROW_STYLE) {
                                        td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                        td class=(TABLE_CELL_STYLE) {
                                            (transaction.kind)
                                            @if transaction.is_fixed {
                                                span class="ml-1 text-xs text-gray-500" { "(fixed)" }
                                            }
                                        }
                                        td class=(TABLE_CELL_STYLE) { (transaction.category) }
                                        td class=(TABLE_CELL_STYLE) {
                                            (transaction.description.as_deref().unwrap_or("-"))
                                        }
                                        td class=(TABLE_CELL_STYLE) {
                                            (amount_cell(transaction, symbol))
                                        }
                                        td class=(TABLE_CELL_STYLE) {
                                            button
                                                type="button"
                                                class=(BUTTON_DELETE_STYLE)
                                                hx-delete=(endpoints::format_endpoint(
                                                    endpoints::DELETE_TRANSACTION,
                                                    transaction.id
                                                ))
                                                hx-target="closest tr"
                                                hx-swap="outerHTML"
                                                hx-confirm="Delete this transaction?"
                                                hx-target-error="#alert-container"
                                            {
                                                "Delete"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}
