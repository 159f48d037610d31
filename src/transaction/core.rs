//! Defines the core data models and database queries for transactions.

use std::{
    fmt::{self, Display},
    ops::RangeInclusive,
    str::FromStr,
};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for transaction database IDs.
pub type TransactionId = i64;

/// The canonical fallback category for records without one.
pub const OTHER_CATEGORY: &str = "Other";

/// The categories offered for income records.
pub const INCOME_CATEGORIES: [&str; 9] = [
    "Salary",
    "Interest Received",
    "Dividend",
    "Bonus",
    "Overtime",
    "Rental Income",
    "Investment",
    "Pension",
    OTHER_CATEGORY,
];

/// The categories offered for expense records.
pub const EXPENSE_CATEGORIES: [&str; 10] = [
    "Food",
    "Transportation",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Clothing",
    "Education",
    "Personal",
    "Gifts",
    OTHER_CATEGORY,
];

/// Whether a transaction records money earned or money spent.
///
/// Raw strings ("income", "Income", "EXPENSE", ...) are normalised to this
/// tagged union once, where records enter the application (form parsing,
/// JSON deserialisation, SQLite row mapping). Internal logic never compares
/// kind strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The canonical lowercase string stored in the database and sent in
    /// forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The fixed category set offered for this kind.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionKind::Income => &INCOME_CATEGORIES,
            TransactionKind::Expense => &EXPENSE_CATEGORIES,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "Income"),
            TransactionKind::Expense => write!(f, "Expense"),
        }
    }
}

/// The error returned when a string is not a recognisable transaction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransactionKindError(String);

impl Display for ParseTransactionKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" is not a valid transaction kind", self.0)
    }
}

impl std::error::Error for ParseTransactionKindError {}

impl FromStr for TransactionKind {
    type Err = ParseTransactionKindError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.eq_ignore_ascii_case("income") {
            Ok(TransactionKind::Income)
        } else if raw.eq_ignore_ascii_case("expense") {
            Ok(TransactionKind::Expense)
        } else {
            Err(ParseTransactionKindError(raw.to_owned()))
        }
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single ledger entry: an event where money was either earned or spent.
///
/// The amount is a magnitude; [TransactionKind] carries the sign. Use
/// [Transaction::signed_amount] where the accounting sign is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this is an income or expense record.
    pub kind: TransactionKind,
    /// A short label for the entry, e.g. "April Salary".
    pub name: String,
    /// The category the entry is filed under. May be empty, in which case
    /// aggregation counts it under [OTHER_CATEGORY].
    pub category: String,
    /// The non-negative magnitude of the transaction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// The amount with its accounting sign applied: positive for income,
    /// negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// The data needed to create or update a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether this is an income or expense record.
    pub kind: TransactionKind,
    /// A short label for the entry.
    pub name: String,
    /// The category the entry is filed under.
    pub category: String,
    /// The non-negative magnitude of the transaction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
}

impl NewTransaction {
    /// Check the invariants that the database cannot express.
    ///
    /// `today` should be today's date in the user's local timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] for zero or negative amounts and
    /// [Error::FutureDate] for dates after `today`.
    pub fn validate(self, today: Date) -> Result<Self, Error> {
        if self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite index used by the dashboard and report page queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction for `user` in the database.
///
/// The caller is expected to have validated the data with
/// [NewTransaction::validate].
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (user_id, kind, name, category, amount, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user.as_i64(),
            new_transaction.kind.as_str(),
            &new_transaction.name,
            &new_transaction.category,
            new_transaction.amount,
            new_transaction.date,
        ),
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        kind: new_transaction.kind,
        name: new_transaction.name,
        category: new_transaction.category,
        amount: new_transaction.amount,
        date: new_transaction.date,
    })
}

/// Retrieve one of `user`'s transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's
///   transactions (or the stored row cannot be parsed),
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let raw = connection
        .prepare(
            "SELECT id, kind, name, category, amount, date FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user.as_i64())],
            map_raw_transaction_row,
        )?;

    match parse_transaction(raw) {
        Some(transaction) => Ok(transaction),
        None => Err(Error::NotFound),
    }
}

/// Defines how transactions should be fetched from [query_transactions].
#[derive(Debug, Default)]
pub struct TransactionQuery {
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Ignore the first N transactions. Only has an effect if `limit` is not `None`.
    pub offset: u64,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Query for `user`'s transactions in the database.
///
/// Rows whose stored kind or date cannot be parsed are skipped with a
/// warning rather than failing the whole query, so a single corrupt row
/// cannot take down every chart that aggregates the result.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    user: UserID,
    filter: TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query_string_parts = vec![
        "SELECT id, kind, name, category, amount, date FROM \"transaction\" WHERE user_id = ?1"
            .to_string(),
    ];
    let mut query_parameters = vec![Value::Integer(user.as_i64())];

    if let Some(date_range) = filter.date_range {
        query_string_parts.push(format!(
            "AND date BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(kind) = filter.kind {
        query_string_parts.push(format!("AND kind = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(kind.as_str().to_string()));
    }

    match filter.sort_date {
        Some(SortOrder::Ascending) => query_string_parts.push("ORDER BY date ASC".to_string()),
        Some(SortOrder::Descending) => query_string_parts.push("ORDER BY date DESC".to_string()),
        None => {}
    }

    if let Some(limit) = filter.limit {
        query_string_parts.push(format!("LIMIT {limit} OFFSET {}", filter.offset));
    }

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter());

    let raw_rows = connection
        .prepare(&query_string)?
        .query_map(params, map_raw_transaction_row)?
        .collect::<Result<Vec<RawTransactionRow>, rusqlite::Error>>()?;

    Ok(raw_rows.into_iter().filter_map(parse_transaction).collect())
}

/// Get the total number of transactions `user` has in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn count_transactions(user: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = :user_id;",
            &[(":user_id", &user.as_i64())],
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
}

/// Overwrite one of `user`'s transactions with new data.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to one of the
///   user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET kind = ?1, name = ?2, category = ?3, amount = ?4, date = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            new_transaction.kind.as_str(),
            &new_transaction.name,
            &new_transaction.category,
            new_transaction.amount,
            new_transaction.date,
            id,
            user.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete one of `user`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to one of the
///   user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// A transaction row before the kind and date strings have been parsed.
struct RawTransactionRow {
    id: TransactionId,
    kind: String,
    name: String,
    category: String,
    amount: f64,
    date: String,
}

fn map_raw_transaction_row(row: &Row) -> Result<RawTransactionRow, rusqlite::Error> {
    Ok(RawTransactionRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
    })
}

/// Normalise a raw row into the [Transaction] model.
///
/// Returns `None` (and logs a warning) for rows whose kind or date column
/// holds a value the application cannot interpret.
fn parse_transaction(raw: RawTransactionRow) -> Option<Transaction> {
    let kind = match raw.kind.parse::<TransactionKind>() {
        Ok(kind) => kind,
        Err(error) => {
            tracing::warn!("skipping transaction {}: {error}", raw.id);
            return None;
        }
    };

    let date = match Date::parse(&raw.date, DATE_FORMAT) {
        Ok(date) => date,
        Err(error) => {
            tracing::warn!(
                "skipping transaction {} with malformed date {:?}: {error}",
                raw.id,
                raw.date
            );
            return None;
        }
    };

    Some(Transaction {
        id: raw.id,
        kind,
        name: raw.name,
        category: raw.category,
        amount: raw.amount,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod new_transaction_tests {
    use time::{Duration, macros::date};

    use crate::Error;

    use super::{NewTransaction, TransactionKind};

    fn new_transaction(amount: f64, date: time::Date) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            name: "Coffee".to_owned(),
            category: "Food".to_owned(),
            amount,
            date,
        }
    }

    #[test]
    fn validate_fails_on_future_date() {
        let today = date!(2025 - 06 - 15);
        let tomorrow = today + Duration::days(1);

        let result = new_transaction(12.0, tomorrow).validate(today);

        assert_eq!(result, Err(Error::FutureDate(tomorrow)));
    }

    #[test]
    fn validate_succeeds_on_today_and_past() {
        let today = date!(2025 - 06 - 15);

        assert!(new_transaction(12.0, today).validate(today).is_ok());
        assert!(
            new_transaction(12.0, today - Duration::days(30))
                .validate(today)
                .is_ok()
        );
    }

    #[test]
    fn validate_fails_on_non_positive_amounts() {
        let today = date!(2025 - 06 - 15);

        assert_eq!(
            new_transaction(0.0, today).validate(today),
            Err(Error::InvalidAmount(0.0))
        );
        assert_eq!(
            new_transaction(-5.0, today).validate(today),
            Err(Error::InvalidAmount(-5.0))
        );
    }
}
