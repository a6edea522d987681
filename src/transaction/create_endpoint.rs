//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    transaction::{
        CategoryName, Transaction, TransactionKind,
        core::create_transaction,
        new_transaction_page::{TransactionFormDefaults, transaction_form_view},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    pub type_: TransactionKind,
    /// The category label, e.g. "Food".
    pub category: String,
    /// The monetary amount.
    pub amount: Decimal,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the transaction is a fixed (recurring) expense.
    #[serde(default)]
    pub is_fixed: bool,
}

/// A route handler for creating a new transaction.
///
/// On success the client is redirected to the transactions view. If
/// validation fails, the form is re-rendered with the submitted values
/// preserved so they can be corrected and resubmitted; nothing is persisted.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> impl IntoResponse {
    let category = match CategoryName::new(&form.category) {
        Ok(category) => category,
        Err(error) => {
            let defaults = TransactionFormDefaults {
                kind: form.type_,
                category: &form.category,
                amount: Some(form.amount),
                date: form.date,
                description: form.description.as_deref(),
                is_fixed: form.is_fixed,
            };

            return transaction_form_view(&defaults, &format!("Error: {error}")).into_response();
        }
    };

    let description = form
        .description
        .filter(|description| !description.trim().is_empty());

    let builder = Transaction::build(form.type_, category, form.amount, form.date)
        .description(description)
        .is_fixed(form.is_fixed);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{body::Body, extract::State, http::Response, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        test_utils::{assert_form_input_with_value, must_get_form, parse_html_fragment},
        transaction::{TransactionKind, count_transactions},
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint};

    fn get_test_state() -> CreateTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn decimal(text: &str) -> rust_decimal::Decimal {
        text.parse().unwrap()
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();

        let form = TransactionForm {
            type_: TransactionKind::Expense,
            category: "Food".to_owned(),
            amount: decimal("12.30"),
            date: date!(2025 - 06 - 05),
            description: Some("lunch".to_owned()),
            is_fixed: false,
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_redirects_to_transactions_view(response);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(1));
    }

    #[tokio::test]
    async fn empty_category_preserves_input_and_persists_nothing() {
        let state = get_test_state();

        let form = TransactionForm {
            type_: TransactionKind::Expense,
            category: "   ".to_owned(),
            amount: decimal("42.00"),
            date: date!(2025 - 06 - 05),
            description: Some("mystery".to_owned()),
            is_fixed: false,
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        // The submitted amount is preserved for correction.
        assert_form_input_with_value(&form, "amount", "number", "42.00");

        let text: String = form.text().collect();
        assert!(
            text.contains("Category cannot be empty"),
            "expected validation message in {text:?}"
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(0));
    }

    #[track_caller]
    fn assert_redirects_to_transactions_view(response: Response<Body>) {
        let location = response
            .headers()
            .get("hx-redirect")
            .expect("expected response to have the header hx-redirect");
        assert_eq!(
            location, "/transactions",
            "got redirect to {location:?}, want redirect to /transactions"
        );
    }

    #[test]
    fn transaction_form_parses_checkbox_and_defaults() {
        let form_data = "type_=expense&category=Rent&amount=1200&date=2025-06-01&is_fixed=true";
        let form: TransactionForm = serde_html_form::from_str(form_data).unwrap();
        assert!(form.is_fixed);
        assert_eq!(form.type_, TransactionKind::Expense);

        let form_data = "type_=income&category=Salary&amount=1000&date=2025-06-01";
        let form: TransactionForm = serde_html_form::from_str(form_data).unwrap();
        assert!(!form.is_fixed);
        assert_eq!(form.description, None);
    }
}
