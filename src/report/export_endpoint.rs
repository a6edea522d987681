//! Defines the endpoint that downloads the monthly report spreadsheet.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    report::{
        export::{XLSX_CONTENT_TYPE, build_monthly_report, report_filename},
        overview_page::ReportQuery,
    },
    timezone::get_local_offset,
    transaction::get_transactions_in_month,
    window::MonthWindow,
};

/// The state needed to export a monthly report.
#[derive(Debug, Clone)]
pub struct ExportReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler that builds the report spreadsheet and serves it as a
/// file download.
///
/// The export is all-or-nothing: any construction failure surfaces as a
/// user-visible error page carrying the underlying cause, never a truncated
/// file.
pub async fn export_monthly_report_endpoint(
    State(state): State<ExportReportState>,
    Query(query): Query<ReportQuery>,
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

    let transactions = get_transactions_in_month(window, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let buffer = build_monthly_report(&transactions, window)
        .inspect_err(|error| tracing::error!("could not build monthly report: {error}"))?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report_filename(window)),
        ),
    ];

    Ok((headers, buffer).into_response())
}

#[cfg(test)]
mod export_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        report::overview_page::ReportQuery,
        test_utils::{assert_content_type, assert_status_ok, get_header},
        transaction::{CategoryName, Transaction, TransactionKind, create_transaction},
    };

    use super::{ExportReportState, export_monthly_report_endpoint};

    fn get_test_state() -> ExportReportState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ExportReportState {
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
    async fn serves_spreadsheet_with_download_headers() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new_unchecked("Food"),
                    "200".parse().unwrap(),
                    date!(2025 - 06 - 05),
                ),
                &connection,
            )
            .unwrap();
        }

        let response = export_monthly_report_endpoint(State(state), Query(june_query()))
            .await
            .unwrap();

        assert_status_ok(&response);
        assert_content_type(
            &response,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        );
        assert_eq!(
            get_header(&response, "content-disposition"),
            "attachment; filename=\"Monthly_Report_June_2025.xlsx\""
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..2], b"PK", "response body is not a ZIP archive");
    }

    #[tokio::test]
    async fn exports_empty_month_successfully() {
        let state = get_test_state();

        let response = export_monthly_report_endpoint(State(state), Query(june_query()))
            .await
            .unwrap();

        assert_status_ok(&response);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..2], b"PK", "response body is not a ZIP archive");
    }
}
