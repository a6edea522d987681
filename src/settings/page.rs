//! The settings page: preference form plus current-month budget usage.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::aggregation::totals,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    settings::{BudgetUsage, Settings, get_or_create_settings},
    timezone::get_local_offset,
    transaction::get_transactions_in_month,
    window::MonthWindow,
};

/// The currency codes offered in the settings form.
const CURRENCY_OPTIONS: [(&str, &str); 5] = [
    ("BDT", "Bangladeshi Taka (৳)"),
    ("USD", "US Dollar ($)"),
    ("EUR", "Euro (€)"),
    ("GBP", "British Pound (£)"),
    ("INR", "Indian Rupee (₹)"),
];

/// The state needed for the settings page.
#[derive(Debug, Clone)]
pub struct SettingsPageState {
    /// The database connection for reading settings and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl FromRef<AppState> for SettingsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The values used to pre-fill the settings form.
///
/// When a submission fails validation the submitted values are threaded back
/// through this struct so the user can correct and resubmit.
pub(super) struct SettingsFormDefaults<'a> {
    pub user_name: &'a str,
    pub email: &'a str,
    pub monthly_budget: String,
    pub currency: &'a str,
}

impl<'a> SettingsFormDefaults<'a> {
    pub(super) fn from_settings(settings: &'a Settings) -> Self {
        Self {
            user_name: &settings.user_name,
            email: settings.email.as_deref().unwrap_or(""),
            monthly_budget: settings.monthly_budget.to_string(),
            currency: &settings.currency,
        }
    }
}

/// Display the settings page.
pub async fn get_settings_page(State(state): State<SettingsPageState>) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = get_or_create_settings(&connection)
        .inspect_err(|error| tracing::error!("could not get settings: {error}"))?;

    let window = MonthWindow::current(local_timezone);
    let month_transactions = get_transactions_in_month(window, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let usage = BudgetUsage {
        budget: settings.monthly_budget,
        spent: totals(&month_transactions).expense,
    };

    Ok(settings_view(&settings, &usage, window).into_response())
}

fn settings_view(settings: &Settings, usage: &BudgetUsage, window: MonthWindow) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();
    let defaults = SettingsFormDefaults::from_settings(settings);
    let form = settings_form_view(&defaults, "");
    let symbol = settings.symbol();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Settings" }

            div class="w-full mb-6 bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
            {
                h2 class="text-lg font-semibold mb-2" { "Budget for " (window.label()) }

                p {
                    "Spent "
                    span class="font-semibold" { (format_currency(usage.spent, symbol)) }
                    @if usage.budget > rust_decimal::Decimal::ZERO {
                        " of "
                        span class="font-semibold" { (format_currency(usage.budget, symbol)) }
                        " (" (usage.percent_used().round_dp(1)) "%), "
                        span class="font-semibold" { (format_currency(usage.remaining(), symbol)) }
                        " remaining."
                    } @else {
                        " this month. No budget set."
                    }
                }
            }

            (form)
        }
    };

    base("Settings", &[], &content)
}

/// Render the settings form.
///
/// The form posts with htmx and replaces itself on validation errors, so the
/// submitted values are preserved for correction.
pub(super) fn settings_form_view(
    defaults: &SettingsFormDefaults<'_>,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::SETTINGS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="user_name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    name="user_name"
                    id="user_name"
                    type="text"
                    value=(defaults.user_name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="email"
                    class=(FORM_LABEL_STYLE)
                {
                    "Email (optional)"
                }

                input
                    name="email"
                    id="email"
                    type="email"
                    value=(defaults.email)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="monthly_budget"
                    class=(FORM_LABEL_STYLE)
                {
                    "Monthly budget"
                }

                input
                    name="monthly_budget"
                    id="monthly_budget"
                    type="number"
                    step="0.01"
                    min="0"
                    value=(defaults.monthly_budget)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="currency"
                    class=(FORM_LABEL_STYLE)
                {
                    "Currency"
                }

                select
                    name="currency"
                    id="currency"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (code, label) in CURRENCY_OPTIONS {
                        option value=(code) selected[defaults.currency == code] {
                            (label)
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Settings" }
        }
    }
}
