//! Card components for the dashboard summary row.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::{SpendingAlert, Totals},
    html::format_currency,
    settings::BudgetUsage,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col gap-1";

const CARD_LABEL_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";

/// Everything the dashboard summary cards display.
pub(super) struct DashboardCards<'a> {
    /// Totals over every recorded transaction.
    pub overall: &'a Totals,
    /// Totals for the current month.
    pub current_month: &'a Totals,
    /// The current month's savings rate as a percentage.
    pub savings_rate: Decimal,
    /// The expense change against the previous month as a percentage.
    pub expense_change: Decimal,
    /// The advisory classification of the expense change, if any.
    pub alert: Option<SpendingAlert>,
    /// The monthly budget and how much of it is used.
    pub budget: &'a BudgetUsage,
    /// A label for the current month, e.g. "June 2025".
    pub month_label: String,
    /// The currency symbol from the user's settings.
    pub symbol: &'a str,
}

fn sign_color_class(amount: Decimal) -> &'static str {
    if amount >= Decimal::ZERO {
        "text-green-600 dark:text-green-400"
    } else {
        "text-red-600 dark:text-red-400"
    }
}

/// Render the dashboard summary cards.
pub(super) fn summary_cards_view(cards: &DashboardCards<'_>) -> Markup {
    let balance = cards.overall.balance();

    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4 mb-4" {
                div class=(CARD_STYLE) {
                    span class=(CARD_LABEL_STYLE) { "Total Income" }
                    span class="text-2xl font-bold text-green-600 dark:text-green-400" {
                        (format_currency(cards.overall.income, cards.symbol))
                    }
                }

                div class=(CARD_STYLE) {
                    span class=(CARD_LABEL_STYLE) { "Total Expenses" }
                    span class="text-2xl font-bold text-red-600 dark:text-red-400" {
                        (format_currency(cards.overall.expense, cards.symbol))
                    }
                }

                div class=(CARD_STYLE) {
                    span class=(CARD_LABEL_STYLE) { "Balance" }
                    span class={"text-2xl font-bold " (sign_color_class(balance))} {
                        (format_currency(balance, cards.symbol))
                    }
                }
            }

            div class="grid grid-cols-1 sm:grid-cols-2 gap-4" {
                div class=(CARD_STYLE) {
                    span class=(CARD_LABEL_STYLE) { "This month (" (cards.month_label) ")" }

                    p {
                        "Income "
                        span class="font-semibold text-green-600 dark:text-green-400" {
                            (format_currency(cards.current_month.income, cards.symbol))
                        }
                        " · Expenses "
                        span class="font-semibold text-red-600 dark:text-red-400" {
                            (format_currency(cards.current_month.expense, cards.symbol))
                        }
                    }

                    p {
                        "Savings rate: "
                        span class="font-semibold" { (cards.savings_rate.round_dp(1)) "%" }
                    }

                    @if let Some(alert) = cards.alert {
                        @let style = match alert {
                            SpendingAlert::Surge => "text-red-600 dark:text-red-400",
                            SpendingAlert::Creeping => "text-yellow-600 dark:text-yellow-400",
                            SpendingAlert::Improved => "text-green-600 dark:text-green-400",
                        };
                        p class={"text-sm " (style)} {
                            (alert.message())
                            " (" (cards.expense_change.round_dp(1)) "% vs last month)"
                        }
                    }
                }

                div class=(CARD_STYLE) {
                    span class=(CARD_LABEL_STYLE) { "Monthly budget" }

                    @if cards.budget.budget > Decimal::ZERO {
                        p {
                            "Spent "
                            span class="font-semibold" {
                                (format_currency(cards.budget.spent, cards.symbol))
                            }
                            " of "
                            span class="font-semibold" {
                                (format_currency(cards.budget.budget, cards.symbol))
                            }
                            " (" (cards.budget.percent_used().round_dp(1)) "%)"
                        }

                        p {
                            "Remaining: "
                            span class={"font-semibold " (sign_color_class(cards.budget.remaining()))} {
                                (format_currency(cards.budget.remaining(), cards.symbol))
                            }
                        }
                    } @else {
                        p class="text-sm text-gray-600 dark:text-gray-400" {
                            "No budget set. You can set one on the settings page."
                        }
                    }
                }
            }
        }
    }
}
