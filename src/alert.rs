//! Alert fragments for reporting errors to users.
//!
//! Alerts are rendered as HTML fragments targeted at the `#alert-container`
//! element, so htmx endpoints can report failures without a full page load.
//! Successful actions redirect or swap content instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const ERROR_STYLE: &str = "flex items-start gap-3 p-4 mb-4 rounded-lg border \
    border-red-300 bg-red-50 text-red-800 \
    dark:border-red-800 dark:bg-gray-800 dark:text-red-400";

/// An error alert shown to the user after a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    message: String,
    details: String,
}

impl Alert {
    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert with an explicit status code.
    pub fn render(self, status_code: StatusCode) -> Response {
        (status_code, self.into_markup()).into_response()
    }

    fn into_markup(self) -> Markup {
        html! {
            div
                role="alert"
                class=(ERROR_STYLE)
                // Clicking the alert dismisses it.
                onclick="this.parentElement.classList.add('hidden')"
            {
                div
                {
                    p class="font-semibold" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="text-sm" { (self.details) }
                    }
                }
            }

            script
            {
                "document.getElementById('alert-container').classList.remove('hidden');"
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.render(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn error_alert_renders_message_and_details() {
        let response =
            Alert::error("Something went wrong", "The database is on fire").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let alert_selector = Selector::parse("div[role='alert']").unwrap();
        let alert = html.select(&alert_selector).next().expect("No alert found");
        let text: String = alert.text().collect();
        assert!(text.contains("Something went wrong"));
        assert!(text.contains("The database is on fire"));
    }

    #[tokio::test]
    async fn render_uses_the_given_status_code() {
        let response = Alert::error("Invalid transaction", "The category cannot be empty.")
            .render(StatusCode::BAD_REQUEST);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
