//! Dashboard HTTP handlers and view rendering.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::{
            by_category, filter_by_month, month_over_month, savings_rate, spending_alert, totals,
            trailing_series,
        },
        cards::{DashboardCards, summary_cards_view},
        charts::{DashboardChart, category_chart, charts_script, trend_chart},
    },
    endpoints,
    html::{
        HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, link,
    },
    navigation::NavBar,
    settings::{BudgetUsage, get_or_create_settings},
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind, get_all_transactions},
    window::MonthWindow,
};

/// How many months the trend chart looks back.
const TREND_MONTHS: usize = 6;

/// How many transactions the recent activity table shows.
const RECENT_TRANSACTIONS: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and settings.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let settings = get_or_create_settings(&connection)
        .inspect_err(|error| tracing::error!("could not get settings: {error}"))?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let window = MonthWindow::current(local_timezone);

    let overall = totals(&transactions);
    let current_month = totals(&filter_by_month(&transactions, window));
    let previous_month = totals(&filter_by_month(&transactions, window.previous()));

    let expense_change = month_over_month(current_month.expense, previous_month.expense);
    // A zero previous month would make 0% read as "no change", so the
    // advisory is suppressed entirely in that case.
    let alert = if previous_month.expense.is_zero() {
        None
    } else {
        spending_alert(expense_change)
    };

    let cards = DashboardCards {
        overall: &overall,
        current_month: &current_month,
        savings_rate: savings_rate(current_month.income, current_month.expense),
        expense_change,
        alert,
        budget: &BudgetUsage {
            budget: settings.monthly_budget,
            spent: current_month.expense,
        },
        month_label: window.label(),
        symbol: settings.symbol(),
    };

    let charts = [
        DashboardChart {
            id: "trend-chart",
            options: trend_chart(&trailing_series(&transactions, window, TREND_MONTHS))
                .to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(&by_category(&transactions, TransactionKind::Expense))
                .to_string(),
        },
    ];

    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTIONS)];

    Ok(dashboard_view(nav_bar, &cards, &charts, recent, settings.symbol()).into_response())
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "recording a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Summaries and charts will show up here once you add some data.
                Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with cards, charts and recent activity.
fn dashboard_view(
    nav_bar: NavBar<'_>,
    cards: &DashboardCards<'_>,
    charts: &[DashboardChart],
    recent: &[Transaction],
    symbol: &str,
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl" {
                (summary_cards_view(cards))

                section
                    id="charts"
                    class="w-full mx-auto mb-4"
                {
                    div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                    {
                        @for chart in charts {
                            div
                                id=(chart.id)
                                class="min-h-[380px] rounded dark:bg-gray-100"
                            {}
                        }
                    }
                }

                section class="w-full mx-auto" {
                    div class="flex items-baseline justify-between mb-4" {
                        h3 class="text-xl font-semibold" { "Recent Transactions" }
                        (link(endpoints::TRANSACTIONS_VIEW, "See all"))
                    }

                    div class="overflow-x-auto rounded-lg shadow" {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                            thead class=(TABLE_HEADER_STYLE) {
                                tr {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                }
                            }
                            tbody {
                                @for transaction in recent {
                                    tr class=(TABLE_ROW_STYLE) {
                                        td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                        td class=(TABLE_CELL_STYLE) { (transaction.category) }
                                        td class=(TABLE_CELL_STYLE) {
                                            (transaction.description.as_deref().unwrap_or("-"))
                                        }
                                        td class=(TABLE_CELL_STYLE) {
                                            @match transaction.kind {
                                                TransactionKind::Income => {
                                                    span class="text-green-600 dark:text-green-400" {
                                                        "+" (format_currency(transaction.amount, symbol))
                                                    }
                                                }
                                                TransactionKind::Expense => {
                                                    span class="text-red-600 dark:text-red-400" {
                                                        "-" (format_currency(transaction.amount, symbol))
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
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(
            "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js".to_owned(),
        ),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod dashboard_tests {
    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use std::sync::{Arc, Mutex};
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{CategoryName, Transaction, TransactionKind, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> DashboardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let state = get_test_state();
        let today = OffsetDateTime::now_utc().date();

        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    TransactionKind::Income,
                    CategoryName::new_unchecked("Salary"),
                    "1000".parse().unwrap(),
                    today,
                ),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new_unchecked("Food"),
                    "50".parse().unwrap(),
                    today - Duration::days(15),
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_chart_exists(&html, "trend-chart");
        assert_chart_exists(&html, "category-chart");
        assert_table_exists(&html);
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let state = get_test_state();

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Nothing here yet"),
            "missing empty state prompt"
        );
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[track_caller]
    fn assert_table_exists(html: &Html) {
        let selector = Selector::parse("table").unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Recent transactions table not found"
        );
    }
}
