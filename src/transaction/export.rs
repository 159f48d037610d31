//! The endpoint for downloading the user's transactions as CSV or JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    transaction::core::{SortOrder, Transaction, TransactionQuery, query_transactions},
    user::UserID,
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The formats the export endpoint can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma separated values, one row per transaction.
    #[default]
    Csv,
    /// A JSON array of transaction objects.
    Json,
}

/// The query string for the export endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// The file format to produce. Defaults to CSV.
    #[serde(default)]
    pub format: ExportFormat,
}

/// One row of the export file.
#[derive(Debug, Serialize)]
struct ExportRecord {
    name: String,
    amount: f64,
    category: String,
    date: String,
    #[serde(rename = "type")]
    kind: String,
}

impl From<Transaction> for ExportRecord {
    fn from(transaction: Transaction) -> Self {
        Self {
            name: transaction.name,
            amount: transaction.amount,
            category: transaction.category,
            date: transaction.date.to_string(),
            kind: transaction.kind.to_string(),
        }
    }
}

/// A route handler that streams the user's transactions back as a CSV or
/// JSON download.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let records: Vec<ExportRecord> = query_transactions(
        user_id,
        TransactionQuery {
            sort_date: Some(SortOrder::Descending),
            ..Default::default()
        },
        &connection,
    )?
    .into_iter()
    .map(ExportRecord::from)
    .collect();
    drop(connection);

    let (body, content_type, file_name) = match query.format {
        ExportFormat::Csv => (
            write_csv(&records)?,
            "text/csv",
            "flowtrack_transactions.csv",
        ),
        ExportFormat::Json => (
            serde_json::to_string_pretty(&records)
                .map_err(|error| Error::JSONSerializationError(error.to_string()))?,
            "application/json",
            "flowtrack_transactions.json",
        ),
    };

    Ok((
        [
            (CONTENT_TYPE, content_type.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

fn write_csv(records: &[ExportRecord]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in records {
        writer
            .serialize(record)
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::ExportError(error.to_string()))
}
