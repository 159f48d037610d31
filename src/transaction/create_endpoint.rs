//! The endpoint for creating transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    timezone::{get_local_offset, local_today},
    transaction::core::{NewTransaction, TransactionKind, create_transaction},
    user::UserID,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for storing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the record is income or an expense. Parsed case-insensitively.
    pub kind: TransactionKind,
    /// A short label for the entry.
    pub name: String,
    /// The category the entry is filed under.
    pub category: String,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
}

impl TransactionForm {
    /// Convert the form data into a validated [NewTransaction].
    ///
    /// # Errors
    /// Returns the validation error for non-positive amounts or future dates.
    pub(super) fn into_new_transaction(self, today: Date) -> Result<NewTransaction, Error> {
        NewTransaction {
            kind: self.kind,
            name: self.name,
            category: self.category,
            amount: self.amount,
            date: self.date,
        }
        .validate(today)
    }
}

/// A route handler for creating a new transaction, redirects to the
/// transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
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

    match create_transaction(new_transaction, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::{Duration, macros::date};

    use crate::{
        PasswordHash,
        db::initialize,
        endpoints,
        transaction::core::{TransactionKind, TransactionQuery, query_transactions},
        user::create_user,
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint};

    fn get_test_state() -> (CreateTransactionState, crate::user::UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            CreateTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    fn lunch_form(amount: f64, date: time::Date) -> TransactionForm {
        TransactionForm {
            kind: TransactionKind::Expense,
            name: "Lunch".to_owned(),
            category: "Food".to_owned(),
            amount,
            date,
        }
    }

    #[tokio::test]
    async fn creates_transaction_and_redirects() {
        let (state, user_id) = get_test_state();
        let db_connection = state.db_connection.clone();

        let response = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Form(lunch_form(12.5, date!(2025 - 01 - 15))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("hx-redirect").unwrap(),
            endpoints::TRANSACTIONS_VIEW
        );

        let connection = db_connection.lock().unwrap();
        let transactions =
            query_transactions(user_id, TransactionQuery::default(), &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].name, "Lunch");
        assert_eq!(transactions[0].amount, 12.5);
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let (state, user_id) = get_test_state();
        let db_connection = state.db_connection.clone();
        let tomorrow = time::OffsetDateTime::now_utc().date() + Duration::days(1);

        let response = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Form(lunch_form(12.5, tomorrow)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = db_connection.lock().unwrap();
        let transactions =
            query_transactions(user_id, TransactionQuery::default(), &connection).unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let (state, user_id) = get_test_state();

        let response = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Form(lunch_form(0.0, date!(2025 - 01 - 15))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
