//! The page and form for recording a new transaction.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::TransactionKind,
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The values used to pre-fill the new transaction form.
///
/// When a submission fails validation the submitted values are threaded back
/// through this struct so the user can correct and resubmit.
pub(super) struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    pub category: &'a str,
    pub amount: Option<Decimal>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub is_fixed: bool,
}

impl TransactionFormDefaults<'_> {
    pub(super) fn empty(today: Date) -> Self {
        Self {
            kind: TransactionKind::Expense,
            category: "",
            amount: None,
            date: today,
            description: None,
            is_fixed: false,
        }
    }
}

/// Display the page for recording a new transaction.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
) -> Response {
    let today = match get_local_offset(&state.local_timezone) {
        Some(offset) => OffsetDateTime::now_utc().to_offset(offset).date(),
        None => OffsetDateTime::now_utc().date(),
    };

    new_transaction_view(TransactionFormDefaults::empty(today)).into_response()
}

fn new_transaction_view(defaults: TransactionFormDefaults<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = transaction_form_view(&defaults, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }
            (form)
        }
    };

    base("New Transaction", &[], &content)
}

/// Render the new transaction form.
///
/// The form posts with htmx and replaces itself on validation errors, so the
/// submitted values are preserved for correction.
pub(super) fn transaction_form_view(
    defaults: &TransactionFormDefaults<'_>,
    error_message: &str,
) -> Markup {
    let is_expense = matches!(defaults.kind, TransactionKind::Expense);
    let amount_str = defaults.amount.map(|amount| amount.to_string());

    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Transaction type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    div class="flex items-center gap-3"
                    {
                        input
                            name="type_"
                            id="transaction-type-expense"
                            type="radio"
                            value="expense"
                            checked[is_expense]
                            required
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for="transaction-type-expense"
                            class=(FORM_RADIO_LABEL_STYLE)
                        {
                            "Expense"
                        }
                    }

                    div class="flex items-center gap-3"
                    {
                        input
                            name="type_"
                            id="transaction-type-income"
                            type="radio"
                            value="income"
                            checked[!is_expense]
                            required
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for="transaction-type-income"
                            class=(FORM_RADIO_LABEL_STYLE)
                        {
                            "Income"
                        }
                    }
                }
            }

            div
            {
                label
                    for="category"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                input
                    name="category"
                    id="category"
                    type="text"
                    placeholder="e.g. Food, Salary, Transport"
                    value=(defaults.category)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="amount"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount"
                }

                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    value=[amount_str.as_deref()]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="date"
                    class=(FORM_LABEL_STYLE)
                {
                    "Date"
                }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(defaults.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="description"
                    class=(FORM_LABEL_STYLE)
                {
                    "Description (optional)"
                }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    value=[defaults.description]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-2"
            {
                input
                    name="is_fixed"
                    id="is_fixed"
                    type="checkbox"
                    value="true"
                    checked[defaults.is_fixed]
                    class="rounded-sm border-gray-300 text-blue-600";

                label
                    for="is_fixed"
                    class=(FORM_LABEL_STYLE)
                {
                    "Fixed (recurring) expense"
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Transaction" }
        }
    }
}
