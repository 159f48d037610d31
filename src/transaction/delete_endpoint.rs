//! The endpoint for deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::core::{TransactionId, delete_transaction},
    user::UserID,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// The table rows on the transactions page target themselves with
/// `hx-swap="outerHTML"`, so a successful delete returns an empty 200
/// response and HTMX removes the row.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => StatusCode::OK.into_response(),
        Err(error @ Error::DeleteMissingTransaction) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        db::initialize,
        transaction::core::{
            NewTransaction, TransactionKind, create_transaction, get_transaction,
        },
        user::{UserID, create_user},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_test_state() -> (DeleteTransactionState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            DeleteTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn deletes_transaction() {
        let (state, user_id) = get_test_state();
        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Expense,
                    name: "Lunch".to_owned(),
                    category: "Food".to_owned(),
                    amount: 12.5,
                    date: date!(2025 - 01 - 15),
                },
                user_id,
                &connection,
            )
            .unwrap()
            .id
        };
        let db_connection = state.db_connection.clone();

        let response =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(transaction_id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(transaction_id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
