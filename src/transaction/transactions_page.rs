//! Render an overview of the user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    aggregation::net_totals,
    endpoints::{self, format_endpoint},
    html::{
        AMOUNT_GREEN_STYLE, AMOUNT_RED_STYLE, BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, link, stat_card,
    },
    navigation::NavBar,
    transaction::core::{
        SortOrder, Transaction, TransactionKind, TransactionQuery, query_transactions,
    },
    user::UserID,
};

/// The page number shown when none is given in the query string.
const DEFAULT_PAGE: u64 = 1;
/// The number of transactions shown per page when none is given.
const DEFAULT_PAGE_SIZE: u64 = 10;

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Controls filtering and pagination of the transactions table.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsPageQuery {
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of transactions to display per page.
    pub per_page: Option<u64>,
    /// Show only transactions of this kind.
    pub kind: Option<TransactionKind>,
}

/// Render the transactions page: totals cards, a filterable paginated table
/// and the export links.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsPageQuery>,
) -> Result<Response, Error> {
    let current_page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    // The totals cards cover every transaction regardless of the kind filter,
    // so fetch the full list once and paginate the filtered view in SQL.
    let all_transactions = query_transactions(user_id, TransactionQuery::default(), &connection)?;

    let page_rows = query_transactions(
        user_id,
        TransactionQuery {
            kind: query.kind,
            sort_date: Some(SortOrder::Descending),
            limit: Some(per_page),
            offset: (current_page - 1) * per_page,
            ..Default::default()
        },
        &connection,
    )?;
    drop(connection);

    let filtered_count = match query.kind {
        Some(kind) => all_transactions
            .iter()
            .filter(|transaction| transaction.kind == kind)
            .count() as u64,
        None => all_transactions.len() as u64,
    };
    let page_count = filtered_count.div_ceil(per_page).max(1);

    let totals = net_totals(&all_transactions);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW);

    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            section class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-6"
            {
                (stat_card("Total Income", totals.income, AMOUNT_GREEN_STYLE))
                (stat_card("Total Expense", totals.expenses, AMOUNT_RED_STYLE))
                (stat_card(
                    "Balance",
                    totals.balance,
                    if totals.balance >= 0.0 { AMOUNT_GREEN_STYLE } else { AMOUNT_RED_STYLE },
                ))
            }

            section class="flex flex-wrap items-center justify-between gap-4 mb-4"
            {
                div class="flex gap-4"
                {
                    (kind_filter_link("All", None, query.kind))
                    (kind_filter_link("Income", Some(TransactionKind::Income), query.kind))
                    (kind_filter_link("Expenses", Some(TransactionKind::Expense), query.kind))
                }

                div class="flex gap-4"
                {
                    (link(&format!("{}?format=csv", endpoints::EXPORT_TRANSACTIONS), "Export CSV"))
                    (link(&format!("{}?format=json", endpoints::EXPORT_TRANSACTIONS), "Export JSON"))
                    (link(endpoints::NEW_TRANSACTION_VIEW, "Add Transaction"))
                }
            }

            @if page_rows.is_empty() {
                p class="py-8 text-center text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. Add one to get started."
                }
            } @else {
                div class="overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }
                        tbody
                        {
                            @for transaction in &page_rows {
                                (transaction_row(transaction))
                            }
                        }
                    }
                }

                (pagination_links(current_page, page_count, per_page, query.kind))
            }
        }
    );

    Ok(base("Transactions", &[], &content).into_response())
}

fn kind_filter_link(
    label: &str,
    target: Option<TransactionKind>,
    current: Option<TransactionKind>,
) -> Markup {
    let url = match target {
        Some(kind) => format!("{}?kind={}", endpoints::TRANSACTIONS_VIEW, kind.as_str()),
        None => endpoints::TRANSACTIONS_VIEW.to_owned(),
    };
    let style = if target == current {
        "font-semibold text-blue-600 dark:text-blue-400 underline"
    } else {
        LINK_STYLE
    };

    html!( a href=(url) class=(style) { (label) } )
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let amount_style = match transaction.kind {
        TransactionKind::Income => AMOUNT_GREEN_STYLE,
        TransactionKind::Expense => AMOUNT_RED_STYLE,
    };
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
            {
                (transaction.name)
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
            }
            td class={(TABLE_CELL_STYLE) " " (amount_style)}
            {
                (format_currency(transaction.signed_amount()))
            }
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.kind) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        hx-confirm="Are you sure you want to delete this transaction? This action cannot be undone."
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn pagination_links(
    current_page: u64,
    page_count: u64,
    per_page: u64,
    kind: Option<TransactionKind>,
) -> Markup {
    let page_url = |page: u64| -> String {
        let mut url = format!(
            "{}?page={}&per_page={}",
            endpoints::TRANSACTIONS_VIEW,
            page,
            per_page
        );
        if let Some(kind) = kind {
            url.push_str(&format!("&kind={}", kind.as_str()));
        }
        url
    };

    html!(
        nav class="flex items-center justify-between pt-4" aria-label="Table navigation"
        {
            span class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Page " (current_page) " of " (page_count)
            }

            div class="flex gap-4"
            {
                @if current_page > 1 {
                    a href=(page_url(current_page - 1)) class=(LINK_STYLE) { "Previous" }
                }

                @if current_page < page_count {
                    a href=(page_url(current_page + 1)) class=(LINK_STYLE) { "Next" }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode},
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Duration, macros::date};

    use crate::{
        PasswordHash,
        db::initialize,
        transaction::core::{NewTransaction, TransactionKind, create_transaction},
        user::{UserID, create_user},
    };

    use super::{TransactionsPageQuery, TransactionsViewState, get_transactions_page};

    fn get_test_state() -> (TransactionsViewState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            TransactionsViewState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    fn seed_transactions(state: &TransactionsViewState, user_id: UserID) {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            NewTransaction {
                kind: TransactionKind::Income,
                name: "April Salary".to_owned(),
                category: "Salary".to_owned(),
                amount: 5000.0,
                date: date!(2025 - 04 - 01),
            },
            user_id,
            &connection,
        )
        .unwrap();
        create_transaction(
            NewTransaction {
                kind: TransactionKind::Expense,
                name: "Groceries".to_owned(),
                category: "Food".to_owned(),
                amount: 150.0,
                date: date!(2025 - 04 - 02),
            },
            user_id,
            &connection,
        )
        .unwrap();
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn displays_totals_and_rows() {
        let (state, user_id) = get_test_state();
        seed_transactions(&state, user_id);

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html(response).await;
        let text = document.root_element().text().collect::<String>();

        assert!(text.contains("$5,000.00"), "want income total in {text}");
        assert!(text.contains("$150.00"), "want expense total in {text}");
        assert!(text.contains("$4,850.00"), "want balance in {text}");
        assert!(text.contains("April Salary"));
        assert!(text.contains("Groceries"));

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(document.select(&row_selector).count(), 2);
    }

    #[tokio::test]
    async fn kind_filter_hides_other_rows() {
        let (state, user_id) = get_test_state();
        seed_transactions(&state, user_id);

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery {
                kind: Some(TransactionKind::Income),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let document = parse_html(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<_> = document.select(&row_selector).collect();

        assert_eq!(rows.len(), 1);
        let row_text: String = rows[0].text().collect();
        assert!(row_text.contains("April Salary"));
    }

    #[tokio::test]
    async fn paginates_long_lists() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for day in 0..15 {
                create_transaction(
                    NewTransaction {
                        kind: TransactionKind::Expense,
                        name: format!("Coffee {day}"),
                        category: "Food".to_owned(),
                        amount: 4.5,
                        date: date!(2025 - 01 - 01) + Duration::days(day),
                    },
                    user_id,
                    &connection,
                )
                .unwrap();
            }
        }

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery {
                page: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let document = parse_html(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(document.select(&row_selector).count(), 5);

        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Page 2 of 2"), "want page indicator in {text}");
    }

    #[tokio::test]
    async fn shows_empty_state_without_transactions() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap();

        let document = parse_html(response).await;
        let text = document.root_element().text().collect::<String>();

        assert!(text.contains("No transactions yet"));
    }

    #[tokio::test]
    async fn rows_have_delete_buttons() {
        let (state, user_id) = get_test_state();
        seed_transactions(&state, user_id);

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap();

        let document = parse_html(response).await;
        let delete_selector = Selector::parse("button[hx-delete]").unwrap();
        assert_eq!(document.select(&delete_selector).count(), 2);
    }
}
