//! Kharcha is a web app for tracking personal income and expenses.
//!
//! This library provides an HTTP server that directly serves HTML pages:
//! a dashboard with monthly aggregates and charts, a transactions ledger,
//! a monthly report with spreadsheet export, and user settings for
//! currency and budget preferences.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod report;
mod routing;
mod settings;
mod timezone;
mod transaction;
mod window;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use routing::build_router;

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as a transaction category.
    #[error("Category cannot be empty")]
    EmptyCategory,

    /// An empty string was submitted as the user's display name.
    #[error("Name cannot be empty")]
    EmptyUserName,

    /// A negative number was submitted as the monthly budget.
    #[error("Monthly budget cannot be negative")]
    NegativeBudget,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    ///
    /// Note that deleting a transaction that does not exist is *not* an
    /// error: deletes are idempotent and report success.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while building the monthly report spreadsheet.
    ///
    /// The inner string carries the underlying cause so it can be shown to
    /// the user. The export either produces a complete buffer or this error,
    /// never a partial file.
    #[error("could not build the report spreadsheet: {0}")]
    ExportError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::ExportError(cause) => render_internal_server_error(InternalServerErrorPage {
                description: "Export Failed",
                fix: &format!("The report could not be generated: {cause}. Go back and try again."),
            }),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::EmptyCategory => Alert::error(
                "Invalid transaction",
                "The category cannot be empty. Enter a category such as \"Food\" or \"Salary\".",
            )
            .render(StatusCode::BAD_REQUEST),
            Error::EmptyUserName => {
                Alert::error("Invalid settings", "The display name cannot be empty.")
                    .render(StatusCode::BAD_REQUEST)
            }
            Error::NegativeBudget => {
                Alert::error("Invalid settings", "The monthly budget cannot be negative.")
                    .render(StatusCode::BAD_REQUEST)
            }
            Error::ExportError(cause) => Alert::error(
                "Could not export the report",
                &format!("The spreadsheet could not be generated: {cause}"),
            )
            .render(StatusCode::INTERNAL_SERVER_ERROR),
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            )
            .render(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .render(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
