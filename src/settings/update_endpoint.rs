//! Defines the endpoint for updating the user settings.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    settings::{
        core::{SettingsUpdate, update_settings},
        page::{SettingsFormDefaults, settings_form_view},
    },
};

/// The state needed to update the settings.
#[derive(Debug, Clone)]
pub struct UpdateSettingsState {
    /// The database connection holding the settings row.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateSettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating the settings.
///
/// Only the mutable fields appear here; the currency symbol is derived from
/// the code and cannot be submitted.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    /// The user's display name.
    pub user_name: String,
    /// The user's email address.
    #[serde(default)]
    pub email: Option<String>,
    /// The monthly spending budget.
    pub monthly_budget: Decimal,
    /// The preferred currency code.
    pub currency: String,
}

/// A route handler for updating the settings.
///
/// On success the client is redirected back to the settings page. If
/// validation fails, the form is re-rendered with the submitted values
/// preserved so they can be corrected and resubmitted; nothing is persisted.
pub async fn update_settings_endpoint(
    State(state): State<UpdateSettingsState>,
    Form(form): Form<SettingsForm>,
) -> impl IntoResponse {
    let validation_error = if form.user_name.trim().is_empty() {
        Some(Error::EmptyUserName)
    } else if form.monthly_budget < Decimal::ZERO {
        Some(Error::NegativeBudget)
    } else {
        None
    };

    if let Some(error) = validation_error {
        let defaults = SettingsFormDefaults {
            user_name: &form.user_name,
            email: form.email.as_deref().unwrap_or(""),
            monthly_budget: form.monthly_budget.to_string(),
            currency: &form.currency,
        };

        return settings_form_view(&defaults, &format!("Error: {error}")).into_response();
    }

    let update = SettingsUpdate {
        user_name: form.user_name.trim().to_owned(),
        email: form
            .email
            .filter(|email| !email.trim().is_empty()),
        monthly_budget: form.monthly_budget,
        currency: form.currency,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_settings(update, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating settings: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod update_settings_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::{
        db::initialize,
        settings::get_or_create_settings,
        test_utils::{assert_hx_redirect, must_get_form, parse_html_fragment},
    };

    use super::{SettingsForm, UpdateSettingsState, update_settings_endpoint};

    fn get_test_state() -> UpdateSettingsState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        UpdateSettingsState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn updates_settings_and_redirects() {
        let state = get_test_state();

        let form = SettingsForm {
            user_name: "Ayesha".to_owned(),
            email: Some("ayesha@example.com".to_owned()),
            monthly_budget: "2500".parse().unwrap(),
            currency: "EUR".to_owned(),
        };

        let response = update_settings_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_hx_redirect(&response, "/settings");

        let connection = state.db_connection.lock().unwrap();
        let settings = get_or_create_settings(&connection).unwrap();
        assert_eq!(settings.user_name, "Ayesha");
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.symbol(), "€");
    }

    #[tokio::test]
    async fn empty_name_preserves_input_and_persists_nothing() {
        let state = get_test_state();

        let form = SettingsForm {
            user_name: "  ".to_owned(),
            email: None,
            monthly_budget: "100".parse().unwrap(),
            currency: "USD".to_owned(),
        };

        let response = update_settings_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        let text: String = form.text().collect();
        assert!(
            text.contains("Name cannot be empty"),
            "expected validation message in {text:?}"
        );

        let connection = state.db_connection.lock().unwrap();
        let settings = get_or_create_settings(&connection).unwrap();
        // Still the defaults.
        assert_eq!(settings.user_name, "User");
        assert_eq!(settings.currency, "BDT");
    }

    #[tokio::test]
    async fn negative_budget_is_rejected() {
        let state = get_test_state();

        let form = SettingsForm {
            user_name: "User".to_owned(),
            email: None,
            monthly_budget: "-50".parse().unwrap(),
            currency: "BDT".to_owned(),
        };

        let response = update_settings_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        let text: String = form.text().collect();
        assert!(text.contains("budget cannot be negative"));

        let connection = state.db_connection.lock().unwrap();
        let settings = get_or_create_settings(&connection).unwrap();
        assert_eq!(settings.monthly_budget, Decimal::ZERO);
    }

    #[tokio::test]
    async fn unrecognized_currency_falls_back_to_taka_symbol() {
        let state = get_test_state();

        let form = SettingsForm {
            user_name: "User".to_owned(),
            email: None,
            monthly_budget: Decimal::ZERO,
            currency: "XYZ".to_owned(),
        };

        let response = update_settings_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_hx_redirect(&response, "/settings");

        let connection = state.db_connection.lock().unwrap();
        let settings = get_or_create_settings(&connection).unwrap();
        assert_eq!(settings.currency, "XYZ");
        assert_eq!(settings.symbol(), "৳");
    }
}
