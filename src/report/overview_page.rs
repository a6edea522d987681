//! The monthly report overview page.
//!
//! Shows one calendar month: totals, per-category breakdowns for income and
//! expenses, and the full transaction list, with a link to download the same
//! data as a spreadsheet.

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
    dashboard::aggregation::{CategoryTotal, Totals, by_category, totals},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    settings::get_or_create_settings,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind, get_transactions_in_month},
    window::MonthWindow,
};

/// How many months back the month picker offers.
const MONTH_PICKER_DEPTH: usize = 12;

/// The state needed for the monthly report page.
#[derive(Debug, Clone)]
pub struct MonthlyReportState {
    /// The database connection for reading transactions and settings.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl FromRef<AppState> for MonthlyReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters selecting which month the report covers.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The calendar month (1-12). Defaults to the current month.
    pub month: Option<u8>,
    /// The 4-digit calendar year. Defaults to the current year.
    pub year: Option<i32>,
}

/// Display the monthly report overview for the selected month.
pub async fn get_monthly_overview_page(
    State(state): State<MonthlyReportState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let window = MonthWindow::from_query(query.month, query.year, local_timezone);
    let current = MonthWindow::current(local_timezone);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = get_or_create_settings(&connection)
        .inspect_err(|error| tracing::error!("could not get settings: {error}"))?;

    let transactions = get_transactions_in_month(window, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let summary = totals(&transactions);
    let income_by_category = by_category(&transactions, TransactionKind::Income);
    let expense_by_category = by_category(&transactions, TransactionKind::Expense);

    // Most recent month first in the picker.
    let mut month_options = current.trailing(MONTH_PICKER_DEPTH);
    month_options.reverse();

    Ok(overview_view(
        window,
        &month_options,
        &summary,
        &income_by_category,
        &expense_by_category,
        &transactions,
        settings.symbol(),
    )
    .into_response())
}

fn month_option_url(window: MonthWindow) -> String {
    format!(
        "{}?month={}&year={}",
        endpoints::MONTHLY_REPORT_VIEW,
        window.month_number(),
        window.year
    )
}

fn export_url(window: MonthWindow) -> String {
    format!(
        "{}?month={}&year={}",
        endpoints::EXPORT_MONTHLY_REPORT,
        window.month_number(),
        window.year
    )
}

fn totals_cards(summary: &Totals, symbol: &str) -> Markup {
    let balance = summary.balance();
    let balance_color = if balance >= rust_decimal::Decimal::ZERO {
        "text-green-600 dark:text-green-400"
    } else {
        "text-red-600 dark:text-red-400"
    };

    html! {
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4 mb-8" {
            div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
                rounded-lg p-4 shadow-md flex flex-col gap-1"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Income" }
                span class="text-2xl font-bold text-green-600 dark:text-green-400" {
                    (format_currency(summary.income, symbol))
                }
            }

            div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
                rounded-lg p-4 shadow-md flex flex-col gap-1"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Expenses" }
                span class="text-2xl font-bold text-red-600 dark:text-red-400" {
                    (format_currency(summary.expense, symbol))
                }
            }

            div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
                rounded-lg p-4 shadow-md flex flex-col gap-1"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Balance" }
                span class={"text-2xl font-bold " (balance_color)} {
                    (format_currency(balance, symbol))
                }
            }
        }
    }
}

fn category_table(heading: &str, categories: &[CategoryTotal], symbol: &str) -> Markup {
    html! {
        div class="mb-8" {
            h3 class="text-xl font-semibold mb-4" { (heading) }

            @if categories.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No entries for this month." }
            } @else {
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
}

fn overview_view(
    window: MonthWindow,
    month_options: &[MonthWindow],
    summary: &Totals,
    income_by_category: &[CategoryTotal],
    expense_by_category: &[CategoryTotal],
    transactions: &[Transaction],
    symbol: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::MONTHLY_REPORT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) {
            div class="w-full max-w-screen-lg" {
                div class="flex flex-wrap items-baseline justify-between mb-6" {
                    h2 class="text-2xl font-bold" { "Monthly Report for " (window.label()) }

                    a
                        href=(export_url(window))
                        class={(BUTTON_PRIMARY_STYLE) " w-auto text-center"}
                    {
                        "Export to Excel"
                    }
                }

                div class="flex flex-wrap gap-2 mb-8" {
                    @for option in month_options {
                        @let is_selected = *option == window;
                        @let style = if is_selected {
                            "px-3 py-1 rounded-full text-sm font-semibold \
                            bg-blue-600 text-white"
                        } else {
                            "px-3 py-1 rounded-full text-sm font-semibold \
                            bg-gray-200 text-gray-700 hover:bg-gray-300 \
                            dark:bg-gray-700 dark:text-gray-200"
                        };
                        a href=(month_option_url(*option)) class=(style) {
                            (option.short_label())
                        }
                    }
                }

                (totals_cards(summary, symbol))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-x-8" {
                    (category_table("Income by Category", income_by_category, symbol))
                    (category_table("Expenses by Category", expense_by_category, symbol))
                }

                h3 class="text-xl font-semibold mb-4" { "All Transactions" }

                @if transactions.is_empty() {
                    p class="text-gray-600 dark:text-gray-400" {
                        "No transactions were recorded in " (window.label()) "."
                    }
                } @else {
                    div class="overflow-x-auto rounded-lg shadow" {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                            thead class=(TABLE_HEADER_STYLE) {
                                tr {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                }
                            }
                            tbody {
                                @for transaction in transactions {
                                    tr class=(TABLE_ROW_STYLE) {
                                        td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                        td class=(TABLE_CELL_STYLE) {
                                            @match transaction.kind {
                                                TransactionKind::Income => {
                                                    span class="text-green-600 dark:text-green-400" {
                                                        (transaction.kind)
                                                    }
                                                }
                                                TransactionKind::Expense => {
                                                    span class="text-red-600 dark:text-red-400" {
                                                        (transaction.kind)
                                                    }
                                                }
                                            }
                                        }
                                        td class=(TABLE_CELL_STYLE) { (transaction.category) }
                                        td class=(TABLE_CELL_STYLE) {
                                            (transaction.description.as_deref().unwrap_or("-"))
                                        }
                                        td class=(TABLE_CELL_STYLE) {
                                            (format_currency(transaction.amount, symbol))
                                        }
                                    }
                                }
                            }
                        }
                    }

                    p class="mt-4" {
                        a href=(export_url(window)) class=(LINK_STYLE) {
                            "Download this report as a spreadsheet"
                        }
                    }
                }
            }
        }
    };

    base("Monthly Report", &[], &content)
}

#[cfg(test)]
mod overview_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{CategoryName, Transaction, TransactionKind, create_transaction},
    };

    use super::{MonthlyReportState, ReportQuery, get_monthly_overview_page};

    fn get_test_state() -> MonthlyReportState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        MonthlyReportState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn june_query() -> ReportQuery {
        ReportQuery {
            month: Some(6),
            year: Some(2025),
        }
    }

    #[tokio::test]
    async fn shows_totals_and_category_tables() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    TransactionKind::Income,
                    CategoryName::new_unchecked("Salary"),
                    "1000".parse().unwrap(),
                    date!(2025 - 06 - 01),
                ),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new_unchecked("Food"),
                    "250".parse().unwrap(),
                    date!(2025 - 06 - 05),
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_monthly_overview_page(State(state), Query(june_query()))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Monthly Report for June 2025"));
        assert!(text.contains("Income by Category"));
        assert!(text.contains("Expenses by Category"));
        assert!(text.contains("Salary"));
        assert!(text.contains("Food"));
    }

    #[tokio::test]
    async fn export_link_targets_selected_month() {
        let state = get_test_state();

        let response = get_monthly_overview_page(State(state), Query(june_query()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;

        let selector = Selector::parse("a").unwrap();
        let has_export_link = html.select(&selector).any(|anchor| {
            anchor.value().attr("href")
                == Some("/reports/monthly/export?month=6&year=2025")
        });
        assert!(has_export_link, "missing export link for June 2025");
    }

    #[tokio::test]
    async fn empty_month_shows_zero_totals_without_error() {
        let state = get_test_state();

        let response = get_monthly_overview_page(State(state), Query(june_query()))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("No transactions were recorded in June 2025"));
    }
}
