//! The income and expense pages: per-kind summary statistics, a category
//! donut chart and the list of records.
//!
//! The two pages are the same view parameterised by [TransactionKind], so
//! both route handlers delegate to one renderer.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{category_totals, summary_statistics},
    charts::{ChartPanel, category_donut_chart, chart_container, charts_script, echarts_script_link},
    endpoints,
    html::{
        AMOUNT_GREEN_STYLE, AMOUNT_RED_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
        stat_card,
    },
    navigation::NavBar,
    transaction::{SortOrder, Transaction, TransactionKind, TransactionQuery, query_transactions},
    user::UserID,
};

/// The state needed for the income and expense pages.
#[derive(Debug, Clone)]
pub struct BreakdownState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BreakdownState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the breakdown page for income records.
pub async fn get_income_page(
    State(state): State<BreakdownState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    breakdown_page(TransactionKind::Income, state, user_id).await
}

/// Display the breakdown page for expense records.
pub async fn get_expense_page(
    State(state): State<BreakdownState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    breakdown_page(TransactionKind::Expense, state, user_id).await
}

struct PageLabels {
    title: &'static str,
    endpoint: &'static str,
    total: &'static str,
    highest: &'static str,
    average: &'static str,
    chart_title: &'static str,
    empty_prompt: &'static str,
    amount_style: &'static str,
}

fn labels_for(kind: TransactionKind) -> PageLabels {
    match kind {
        TransactionKind::Income => PageLabels {
            title: "Income",
            endpoint: endpoints::INCOME_VIEW,
            total: "Total Income",
            highest: "Highest Income",
            average: "Average Income",
            chart_title: "Income by Category",
            empty_prompt: "No income recorded yet.",
            amount_style: AMOUNT_GREEN_STYLE,
        },
        TransactionKind::Expense => PageLabels {
            title: "Expenses",
            endpoint: endpoints::EXPENSE_VIEW,
            total: "Total Expense",
            highest: "Highest Expense",
            average: "Average Expense",
            chart_title: "Expenses by Category",
            empty_prompt: "No expenses recorded yet.",
            amount_style: AMOUNT_RED_STYLE,
        },
    }
}

async fn breakdown_page(
    kind: TransactionKind,
    state: BreakdownState,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let records = query_transactions(
        user_id,
        TransactionQuery {
            kind: Some(kind),
            sort_date: Some(SortOrder::Descending),
            ..Default::default()
        },
        &connection,
    )?;
    drop(connection);

    let stats = summary_statistics(&records);
    let totals = category_totals(&records, kind);
    let labels = labels_for(kind);

    let nav_bar = NavBar::new(labels.endpoint);
    let chart = ChartPanel::new(
        "category-chart",
        &category_donut_chart(labels.chart_title, &totals),
    );

    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex items-center justify-between mb-6"
            {
                h2 class="text-2xl font-bold" { (labels.title) }
                (link(endpoints::NEW_TRANSACTION_VIEW, "Add Transaction"))
            }

            section class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-6"
            {
                (stat_card(labels.total, stats.total, labels.amount_style))
                (stat_card(labels.highest, stats.highest, labels.amount_style))
                (stat_card(labels.average, stats.average, labels.amount_style))
            }

            @if records.is_empty() {
                p class="py-8 text-center text-gray-500 dark:text-gray-400"
                {
                    (labels.empty_prompt)
                }
            } @else {
                section class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (chart_container(&chart))
                    (records_table(&records, &labels))
                }
            }
        }
    );

    // No chart container is rendered for an empty page, so skip the chart
    // scripts too.
    let scripts = if records.is_empty() {
        vec![]
    } else {
        vec![echarts_script_link(), charts_script(&[chart])]
    };

    Ok(base(labels.title, &scripts, &content).into_response())
}

fn records_table(records: &[Transaction], labels: &PageLabels) -> Markup {
    html!(
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
                    }
                }
                tbody
                {
                    @for record in records {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
                            {
                                (record.name)
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(CATEGORY_BADGE_STYLE) { (record.category) }
                            }
                            td class={(TABLE_CELL_STYLE) " " (labels.amount_style)}
                            {
                                (format_currency(record.amount))
                            }
                            td class=(TABLE_CELL_STYLE) { (record.date) }
                        }
                    }
                }
            }
        }
    )
}
