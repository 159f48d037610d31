//! The dashboard page: an overview of the user's finances for the current
//! year.
//!
//! Shows the income/expense/balance stat cards, the monthly net bar chart,
//! the spending-by-category donut and the most recent transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, Month};

use crate::{
    AppState, Error,
    aggregation::{NetTotals, category_totals, monthly_net_series, net_totals},
    charts::{ChartPanel, category_donut_chart, chart_container, charts_script, echarts_script_link, overview_chart},
    endpoints,
    html::{
        AMOUNT_GREEN_STYLE, AMOUNT_RED_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, base,
        format_currency, link, stat_card,
    },
    navigation::NavBar,
    timezone::{get_local_offset, local_today},
    transaction::{
        SortOrder, Transaction, TransactionKind, TransactionQuery, query_transactions,
    },
    user::UserID,
};

/// How many transactions to show in the recent transactions list.
const RECENT_TRANSACTION_COUNT: u64 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = local_today(local_offset);
    let year = today.year();
    let start_of_year = Date::from_calendar_date(year, Month::January, 1)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), year.to_string()))?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = query_transactions(
        user_id,
        TransactionQuery {
            date_range: Some(start_of_year..=today),
            ..Default::default()
        },
        &connection,
    )
    .inspect_err(|error| tracing::error!("Could not get transactions for this year: {error}"))?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let recent_transactions = query_transactions(
        user_id,
        TransactionQuery {
            sort_date: Some(SortOrder::Descending),
            limit: Some(RECENT_TRANSACTION_COUNT),
            ..Default::default()
        },
        &connection,
    )?;
    drop(connection);

    let totals = net_totals(&transactions);
    let series = monthly_net_series(&transactions, year);
    let expense_totals = category_totals(&transactions, TransactionKind::Expense);

    let charts = [
        ChartPanel::new("overview-chart", &overview_chart(&series)),
        ChartPanel::new(
            "spending-chart",
            &category_donut_chart("Spending by Category", &expense_totals),
        ),
    ];

    Ok(dashboard_view(nav_bar, &totals, &charts, &recent_transactions).into_response())
}

/// Renders the dashboard page when no transaction data exists.
///
/// Displays a helpful message with a link to add a first transaction.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you record some income or
                expenses. Get started by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with cards, charts and the recent
/// transactions list.
fn dashboard_view(
    nav_bar: NavBar<'_>,
    totals: &NetTotals,
    charts: &[ChartPanel],
    recent_transactions: &[Transaction],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class=(PAGE_CONTAINER_STYLE)
        {
            section class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-6"
            {
                (stat_card(
                    "Total Balance",
                    totals.balance,
                    if totals.balance >= 0.0 { AMOUNT_GREEN_STYLE } else { AMOUNT_RED_STYLE },
                ))
                (stat_card("Total Income", totals.income, AMOUNT_GREEN_STYLE))
                (stat_card("Total Expense", totals.expenses, AMOUNT_RED_STYLE))
            }

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in charts {
                        (chart_container(chart))
                    }
                }
            }

            section class="w-full"
            {
                div class="flex items-center justify-between mb-4"
                {
                    h3 class="text-xl font-semibold" { "Recent Transactions" }
                    (link(endpoints::TRANSACTIONS_VIEW, "View all"))
                }

                div class="bg-white dark:bg-gray-800 rounded-lg shadow divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in recent_transactions {
                        (recent_transaction_entry(transaction))
                    }
                }
            }
        }
    );

    let scripts = [echarts_script_link(), charts_script(charts)];

    base("Dashboard", &scripts, &content)
}

fn recent_transaction_entry(transaction: &Transaction) -> Markup {
    let amount_style = match transaction.kind {
        TransactionKind::Income => AMOUNT_GREEN_STYLE,
        TransactionKind::Expense => AMOUNT_RED_STYLE,
    };

    html!(
        div class="flex items-center justify-between px-4 py-3"
        {
            div
            {
                div class="font-medium" { (transaction.name) }
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
            }

            div class="text-right"
            {
                div class=(amount_style)
                {
                    (format_currency(transaction.signed_amount()))
                }
                div class="text-sm text-gray-500 dark:text-gray-400" { (transaction.date) }
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
        extract::State,
        http::{Response, StatusCode},
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash,
        db::initialize,
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::{UserID, create_user},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> (DashboardState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            DashboardState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let conn = state.db_connection.lock().unwrap();
            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Income,
                    name: "Salary".to_owned(),
                    category: "Salary".to_owned(),
                    amount: 5000.0,
                    date: today,
                },
                user_id,
                &conn,
            )
            .unwrap();
            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Expense,
                    name: "Groceries".to_owned(),
                    category: "Food".to_owned(),
                    amount: 150.0,
                    date: today,
                },
                user_id,
                &conn,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html(response).await;

        assert_chart_exists(&html, "overview-chart");
        assert_chart_exists(&html, "spending-chart");

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$5,000.00"), "want income total in {text}");
        assert!(text.contains("$150.00"), "want expense total in {text}");
        assert!(text.contains("$4,850.00"), "want balance in {text}");
        assert!(text.contains("Groceries"), "want recent transaction in {text}");
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Nothing here yet"),
            "want no-data prompt in {text}"
        );
    }

    #[tokio::test]
    async fn dashboard_ignores_other_users_transactions() {
        let (state, user_id) = get_test_state();
        let other_user = {
            let conn = state.db_connection.lock().unwrap();
            let other_user = create_user(
                "other@example.com",
                PasswordHash::new_unchecked("hunter2"),
                &conn,
            )
            .unwrap();
            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Income,
                    name: "Their Salary".to_owned(),
                    category: "Salary".to_owned(),
                    amount: 9999.0,
                    date: OffsetDateTime::now_utc().date() - Duration::days(1),
                },
                other_user.id,
                &conn,
            )
            .unwrap();
            other_user.id
        };

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Nothing here yet"),
            "user {user_id} should not see transactions of user {other_user}: {text}"
        );
    }
}
