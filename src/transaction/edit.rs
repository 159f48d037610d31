//! The page and endpoint for editing an existing transaction.
//!
//! Edits persist through the update endpoint like every other write; there
//! is no client-side-only editing.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, base, dollar_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::{get_local_offset, local_today},
    transaction::{
        core::{TransactionId, get_transaction, update_transaction},
        create_endpoint::TransactionForm,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
    user::UserID,
};

/// The state needed to show the edit page and apply updates.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = local_today(local_offset);

    let connection = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW);
    let form_fields = transaction_form_fields(&TransactionFormDefaults {
        kind: transaction.kind,
        name: Some(&transaction.name),
        category: Some(&transaction.category),
        amount: Some(transaction.amount),
        date: transaction.date,
        max_date: today,
    });
    let update_route = format_endpoint(endpoints::TRANSACTION, transaction.id);

    let content = html!(
        (nav_bar.into_html())

        div class="flex flex-col items-center px-6 py-8 mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl my-4"
            {
                "Edit Transaction"
            }

            form
                hx-put=(update_route)
                hx-indicator="#indicator"
                hx-target-error="#alert-container"
                class="space-y-4 md:space-y-6 w-full"
            {
                (form_fields)

                button
                    type="submit" id="submit-button" tabindex="0"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator"
                    {
                        (loading_spinner())
                    }
                    "Save"
                }
            }
        }
    );

    Ok(base("Edit Transaction", &[dollar_input_styles()], &content).into_response())
}

/// A route handler for updating a transaction, redirects to the transactions
/// view on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(data): Form<TransactionForm>,
) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
        }
    };

    let new_transaction = match data.into_new_transaction(local_today(local_offset)) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, user_id, new_transaction, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
